use std::sync::Mutex;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::NodeConfig;
use crate::network::HttpPeerClient;
use crate::node::LedgerNode;

/// Shared application state: the node behind its single writer lock, and
/// the HTTP client used to reach peers.
pub struct AppState {
    pub node: Mutex<LedgerNode>,
    pub peers_client: HttpPeerClient,
}

impl AppState {
    pub fn new(cfg: &NodeConfig) -> Result<Self, reqwest::Error> {
        let mut node = LedgerNode::new(cfg.difficulty);
        if !cfg.bootstrap_peers.is_empty() {
            match node.register_peers(cfg.bootstrap_peers.iter().cloned()) {
                Ok(added) => info!("registered {added} bootstrap peers"),
                Err(e) => warn!("ignoring bootstrap peers: {e}"),
            }
        }
        Ok(Self {
            node: Mutex::new(node),
            peers_client: HttpPeerClient::new(cfg.peer_timeout, cfg.max_peer_chain_bytes)?,
        })
    }
}

/// Query string of `GET /chain`. Peers fetch with `consensus=false` so that
/// serving a chain never triggers a consensus pass of its own.
#[derive(Debug, Deserialize)]
pub struct ChainQuery {
    #[serde(default = "run_consensus")]
    pub consensus: bool,
}

fn run_consensus() -> bool {
    true
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub height: usize,
    pub difficulty: u32,
    pub pending: usize,
    pub peers: usize,
}
