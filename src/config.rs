use std::env;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX};

pub const DEFAULT_MAX_PEER_CHAIN_BYTES: usize = 16 * 1024 * 1024;

/// Runtime settings, read from the environment (a `.env` file is loaded
/// first by `main`).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    pub difficulty: u32,
    pub peer_timeout: Duration,
    /// Largest peer `/chain` response body accepted during consensus.
    pub max_peer_chain_bytes: usize,
    /// Peers registered at startup (`PEERS=host:port,host:port`).
    pub bootstrap_peers: Vec<String>,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            difficulty: DEFAULT_DIFFICULTY,
            peer_timeout: Duration::from_secs(5),
            max_peer_chain_bytes: DEFAULT_MAX_PEER_CHAIN_BYTES,
            bootstrap_peers: Vec::new(),
        }
    }
}

impl NodeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Bad values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or("PORT", lookup("PORT"), defaults.port);

        let mut difficulty = parse_or("DIFFICULTY", lookup("DIFFICULTY"), defaults.difficulty);
        if difficulty > DIFF_MAX {
            warn!("DIFFICULTY={difficulty} above max {DIFF_MAX}, clamping");
            difficulty = DIFF_MAX;
        }

        let peer_timeout = parse_or("PEER_TIMEOUT_SECS", lookup("PEER_TIMEOUT_SECS"), 5u64);
        let max_peer_chain_bytes = parse_or(
            "MAX_PEER_CHAIN_BYTES",
            lookup("MAX_PEER_CHAIN_BYTES"),
            defaults.max_peer_chain_bytes,
        );
        let bootstrap_peers = lookup("PEERS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host,
            port,
            difficulty,
            peer_timeout: Duration::from_secs(peer_timeout.max(1)),
            max_peer_chain_bytes,
            bootstrap_peers,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            warn!("invalid {key}={v:?}, using default");
            default
        }),
    }
}
