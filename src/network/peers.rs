use std::collections::BTreeSet;

use crate::error::NodeError;

/// Addresses (`host:port`) of the other nodes. Only grows; iteration order is
/// sorted so reconciliation visits peers in a stable order.
#[derive(Debug, Default, Clone)]
pub struct PeerSet {
    peers: BTreeSet<String>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch of peers. Blank entries are ignored; an empty batch
    /// is a caller error. Returns how many addresses were new.
    pub fn register<I, S>(&mut self, batch: I) -> Result<usize, NodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen_any = false;
        let mut added = 0;
        for peer in batch {
            let peer: String = peer.into();
            let peer = peer.trim();
            if peer.is_empty() {
                continue;
            }
            seen_any = true;
            if self.peers.insert(peer.to_string()) {
                added += 1;
            }
        }
        if !seen_any {
            return Err(NodeError::EmptyPeerBatch);
        }
        Ok(added)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.peers.iter()
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.peers.iter().cloned().collect()
    }
}
