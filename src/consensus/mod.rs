//! Longest-chain consensus.
//!
//! A node adopts a peer's chain only when it is strictly longer than the
//! local one and passes full validation. Equal-length chains are never
//! adopted. Peers that cannot be reached, time out, or send garbage are
//! skipped for the rest of the pass.

use std::future::Future;
use std::sync::Mutex;

use futures::future::join_all;
use log::{debug, info, warn};

use crate::blockchain::Blockchain;
use crate::error::NodeError;
use crate::network::PeerSet;
use crate::node::{ChainDump, LedgerNode};

/// Where peer chains come from. Implemented over HTTP by
/// `network::HttpPeerClient`.
pub trait ChainSource {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = Result<ChainDump, NodeError>> + Send;
}

/// Turn a peer's dump into a validated `Blockchain`, using the same block
/// type and the same `check_validity` path as local data.
pub fn normalize(peer: &str, dump: ChainDump, difficulty: u32) -> Result<Blockchain, NodeError> {
    if dump.length != dump.chain.len() {
        return Err(NodeError::InvalidPeerChain {
            peer: peer.to_string(),
            reason: format!(
                "reported length {} but sent {} blocks",
                dump.length,
                dump.chain.len()
            ),
        });
    }
    Blockchain::from_blocks(dump.chain, difficulty).ok_or_else(|| NodeError::InvalidPeerChain {
        peer: peer.to_string(),
        reason: "chain failed validation".to_string(),
    })
}

/// Scan fetch results in order and keep the longest valid chain strictly
/// longer than `local_len`. The first peer to reach a length wins ties.
fn pick_longest<I>(local_len: usize, difficulty: u32, fetched: I) -> Option<Blockchain>
where
    I: IntoIterator<Item = (String, Result<ChainDump, NodeError>)>,
{
    let mut best_len = local_len;
    let mut best = None;
    for (peer, result) in fetched {
        let dump = match result {
            Ok(dump) => dump,
            Err(e) => {
                warn!("skipping peer {peer}: {e}");
                continue;
            }
        };
        if dump.length <= best_len {
            debug!("peer {} chain length {} not longer than {}", peer, dump.length, best_len);
            continue;
        }
        match normalize(&peer, dump, difficulty) {
            Ok(chain) => {
                best_len = chain.len();
                best = Some(chain);
            }
            Err(e) => warn!("skipping peer {peer}: {e}"),
        }
    }
    best
}

/// Synchronous reconciliation of `chain` against every peer.
/// Returns whether the local chain was replaced.
pub fn reconcile<F>(chain: &mut Blockchain, peers: &PeerSet, mut fetch_chain: F) -> bool
where
    F: FnMut(&str) -> Result<ChainDump, NodeError>,
{
    let fetched = peers
        .iter()
        .map(|peer| (peer.clone(), fetch_chain(peer.as_str())))
        .collect::<Vec<_>>();
    match pick_longest(chain.len(), chain.difficulty(), fetched) {
        Some(longest) => {
            info!(
                "consensus: replacing chain of {} blocks with {} blocks",
                chain.len(),
                longest.len()
            );
            chain.replace_with(longest);
            true
        }
        None => false,
    }
}

/// Reconcile a shared node. Peers are fetched concurrently with the lock
/// released; the swap happens under the lock and only if the winner is
/// still longer than the local chain at that point.
pub async fn reconcile_node<S: ChainSource>(node: &Mutex<LedgerNode>, source: &S) -> bool {
    let (peers, local_len, difficulty) = {
        let node = node.lock().expect("mutex poisoned");
        (
            node.peers().to_vec(),
            node.chain().len(),
            node.chain().difficulty(),
        )
    };
    if peers.is_empty() {
        return false;
    }

    let fetched = join_all(peers.iter().map(|peer| async move {
        (peer.clone(), source.fetch_chain(peer).await)
    }))
    .await;

    let Some(longest) = pick_longest(local_len, difficulty, fetched) else {
        return false;
    };
    let mut node = node.lock().expect("mutex poisoned");
    node.adopt_chain(longest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::NewTransaction;
    use std::collections::HashMap;

    const DIFFICULTY: u32 = 1;

    fn chain_of(len: usize) -> Blockchain {
        let mut node = LedgerNode::new(DIFFICULTY);
        for i in 1..len {
            node.submit_transaction(NewTransaction::new("peer", format!("post {i}")))
                .unwrap();
            node.mine().unwrap();
        }
        node.chain().clone()
    }

    fn dump(chain: &Blockchain) -> ChainDump {
        ChainDump {
            length: chain.len(),
            chain: chain.blocks().to_vec(),
        }
    }

    fn peers(names: &[&str]) -> PeerSet {
        let mut set = PeerSet::new();
        set.register(names.iter().copied()).unwrap();
        set
    }

    #[test]
    fn adopts_longer_valid_chain() {
        let mut local = chain_of(3);
        let remote = chain_of(5);
        let remote_dump = dump(&remote);

        let replaced = reconcile(&mut local, &peers(&["p1"]), |_| Ok(remote_dump.clone()));

        assert!(replaced);
        assert_eq!(local.blocks(), remote.blocks());
    }

    #[test]
    fn rejects_longer_invalid_chain() {
        let mut local = chain_of(3);
        let before = local.blocks().to_vec();
        let mut bad = dump(&chain_of(5));
        bad.chain[3].transactions[0].content = "tampered".into();

        assert!(!reconcile(&mut local, &peers(&["p1"]), |_| Ok(bad.clone())));
        assert_eq!(local.blocks(), before.as_slice());
    }

    #[test]
    fn equal_length_is_never_adopted() {
        let mut local = chain_of(3);
        let before = local.blocks().to_vec();
        let other = dump(&chain_of(3));

        assert!(!reconcile(&mut local, &peers(&["p1"]), |_| Ok(other.clone())));
        assert_eq!(local.blocks(), before.as_slice());
    }

    #[test]
    fn unreachable_peers_are_skipped() {
        let mut local = chain_of(2);
        let remote = dump(&chain_of(4));

        let replaced = reconcile(&mut local, &peers(&["down", "up"]), |peer| {
            if peer == "down" {
                Err(NodeError::PeerUnreachable {
                    peer: peer.to_string(),
                    reason: "connection refused".into(),
                })
            } else {
                Ok(remote.clone())
            }
        });

        assert!(replaced);
        assert_eq!(local.len(), 4);
    }

    #[test]
    fn longest_of_several_wins() {
        let mut local = chain_of(2);
        let chains: HashMap<&str, ChainDump> = [
            ("a", dump(&chain_of(4))),
            ("b", dump(&chain_of(6))),
            ("c", dump(&chain_of(5))),
        ]
        .into_iter()
        .collect();

        assert!(reconcile(&mut local, &peers(&["a", "b", "c"]), |peer| {
            Ok(chains[peer].clone())
        }));
        assert_eq!(local.blocks(), chains["b"].chain.as_slice());
    }

    #[test]
    fn lying_about_length_is_rejected() {
        let mut local = chain_of(2);
        let mut liar = dump(&chain_of(2));
        liar.length = 10;

        assert!(!reconcile(&mut local, &peers(&["p1"]), |_| Ok(liar.clone())));
        assert_eq!(local.len(), 2);
    }

    #[test]
    fn normalize_parses_peer_json_into_blocks() {
        let remote = chain_of(3);
        let json = serde_json::to_string(&dump(&remote)).unwrap();
        let parsed: ChainDump = serde_json::from_str(&json).unwrap();

        let chain = normalize("p1", parsed, DIFFICULTY).unwrap();
        assert_eq!(chain.blocks(), remote.blocks());
    }

    struct FakeSource(HashMap<String, ChainDump>);

    impl ChainSource for FakeSource {
        async fn fetch_chain(&self, peer: &str) -> Result<ChainDump, NodeError> {
            self.0
                .get(peer)
                .cloned()
                .ok_or_else(|| NodeError::PeerUnreachable {
                    peer: peer.to_string(),
                    reason: "timed out".into(),
                })
        }
    }

    #[actix_web::test]
    async fn reconcile_node_swaps_shared_chain() {
        let node = Mutex::new(LedgerNode::new(DIFFICULTY));
        node.lock()
            .unwrap()
            .register_peers(["slow:1", "good:2"])
            .unwrap();

        let remote = chain_of(3);
        let source = FakeSource(HashMap::from([("good:2".to_string(), dump(&remote))]));

        assert!(reconcile_node(&node, &source).await);
        assert_eq!(node.lock().unwrap().chain().blocks(), remote.blocks());

        // second pass finds nothing longer
        assert!(!reconcile_node(&node, &source).await);
    }

    #[actix_web::test]
    async fn reconcile_node_without_peers_is_noop() {
        let node = Mutex::new(LedgerNode::new(DIFFICULTY));
        let source = FakeSource(HashMap::new());
        assert!(!reconcile_node(&node, &source).await);
        assert_eq!(node.lock().unwrap().chain().len(), 1);
    }
}
