use std::time::Duration;

use log::{debug, warn};

use crate::blockchain::Block;
use crate::consensus::ChainSource;
use crate::error::NodeError;
use crate::node::ChainDump;

/// HTTP client for talking to other nodes. Every request is bounded by the
/// configured timeout; a timed-out peer looks exactly like an unreachable one.
/// Chain responses are also capped at `max_chain_bytes`.
#[derive(Debug, Clone)]
pub struct HttpPeerClient {
    http: reqwest::Client,
    max_chain_bytes: usize,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration, max_chain_bytes: usize) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            max_chain_bytes,
        })
    }

    /// `GET http://{peer}/chain?consensus=false`. The peer answers with its
    /// local chain only, so fetching never fans out into further fetches.
    pub async fn fetch(&self, peer: &str) -> Result<ChainDump, NodeError> {
        let mut resp = self
            .http
            .get(peer_url(peer, "chain?consensus=false"))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unreachable(peer, e))?;

        if let Some(len) = resp.content_length() {
            if len > self.max_chain_bytes as u64 {
                return Err(self.oversized(peer));
            }
        }
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| unreachable(peer, e))? {
            if body.len() + chunk.len() > self.max_chain_bytes {
                return Err(self.oversized(peer));
            }
            body.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&body).map_err(|e| NodeError::InvalidPeerChain {
            peer: peer.to_string(),
            reason: e.to_string(),
        })
    }

    fn oversized(&self, peer: &str) -> NodeError {
        NodeError::InvalidPeerChain {
            peer: peer.to_string(),
            reason: format!("response larger than {} bytes", self.max_chain_bytes),
        }
    }

    /// `POST http://{peer}/add_block` with the sealed block record.
    pub async fn announce(&self, peer: &str, block: &Block) -> Result<(), NodeError> {
        self.http
            .post(peer_url(peer, "add_block"))
            .json(block)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map(|_| ())
            .map_err(|e| unreachable(peer, e))
    }

    /// Fire-and-forget announcement of a freshly mined block to every peer.
    /// Failures are logged; the local append is never undone.
    pub fn broadcast_block(&self, peers: Vec<String>, block: Block) {
        for peer in peers {
            let client = self.clone();
            let block = block.clone();
            actix_web::rt::spawn(async move {
                match client.announce(&peer, &block).await {
                    Ok(()) => debug!("announced block #{} to {}", block.index, peer),
                    Err(e) => warn!("announce block #{} failed: {}", block.index, e),
                }
            });
        }
    }
}

impl ChainSource for HttpPeerClient {
    async fn fetch_chain(&self, peer: &str) -> Result<ChainDump, NodeError> {
        self.fetch(peer).await
    }
}

fn unreachable(peer: &str, e: reqwest::Error) -> NodeError {
    NodeError::PeerUnreachable {
        peer: peer.to_string(),
        reason: e.to_string(),
    }
}

/// Peers are registered as `host:port`; a scheme is accepted if present.
fn peer_url(peer: &str, path: &str) -> String {
    let base = peer.trim_end_matches('/');
    if base.starts_with("http://") || base.starts_with("https://") {
        format!("{base}/{path}")
    } else {
        format!("http://{base}/{path}")
    }
}
