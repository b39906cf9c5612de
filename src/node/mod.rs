use std::collections::HashSet;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::blockchain::{Block, Blockchain, proof_of_work};
use crate::error::{NodeError, RejectReason};
use crate::network::PeerSet;
use crate::transaction::{NewTransaction, PendingPool, Transaction, unix_now};

/// Wire form of a full chain, as served by `GET /chain`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainDump {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// A candidate block cut from the pending pool, ready for Proof-of-Work.
/// `sealed` is how many pool entries the block carries.
#[derive(Debug, Clone)]
pub struct MiningJob {
    pub block: Block,
    pub sealed: usize,
    pub difficulty: u32,
}

impl MiningJob {
    /// Run the nonce search, returning the block (with its winning nonce)
    /// and the proof hash.
    pub fn solve(mut self) -> (Self, String) {
        let proof = proof_of_work(&mut self.block, self.difficulty);
        (self, proof)
    }
}

/// One node's state: the chain, the pending pool and the known peers.
/// Every mutation goes through the methods below.
#[derive(Debug, Clone)]
pub struct LedgerNode {
    chain: Blockchain,
    pool: PendingPool,
    peers: PeerSet,
}

impl LedgerNode {
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: Blockchain::new(difficulty),
            pool: PendingPool::new(),
            peers: PeerSet::new(),
        }
    }

    pub fn chain(&self) -> &Blockchain {
        &self.chain
    }

    pub fn pool(&self) -> &PendingPool {
        &self.pool
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    /// Validate and stamp a client transaction, then queue it.
    pub fn submit_transaction(&mut self, req: NewTransaction) -> Result<Transaction, NodeError> {
        let tx = req.into_transaction()?;
        self.pool.push(tx.clone());
        debug!("queued transaction by {} (pool size {})", tx.author, self.pool.len());
        Ok(tx)
    }

    /// Package the whole pool into a candidate extending the current tip.
    pub fn prepare_mining(&self) -> Result<MiningJob, NodeError> {
        if self.pool.is_empty() {
            return Err(NodeError::EmptyPool);
        }
        let tip = self.chain.last_block()?;
        let block = Block::candidate(
            tip.index + 1,
            self.pool.snapshot(),
            unix_now(),
            tip.hash.clone(),
        );
        Ok(MiningJob {
            block,
            sealed: self.pool.len(),
            difficulty: self.chain.difficulty(),
        })
    }

    /// Append a solved job. The pool only loses the sealed transactions once
    /// the append succeeded; a tip that moved since `prepare_mining` shows up
    /// as `LinkMismatch` and leaves everything pending.
    pub fn commit_mined(&mut self, job: MiningJob, proof: &str) -> Result<Block, RejectReason> {
        let block = job.block;
        self.chain.add_block(block, proof)?;
        self.pool.drain_sealed(job.sealed);
        let sealed = self.chain.last_block().map_err(|_| RejectReason::LinkMismatch)?;
        info!(
            "mined block #{} ({} txs, nonce={}, hash={})",
            sealed.index,
            sealed.transactions.len(),
            sealed.nonce,
            sealed.hash
        );
        Ok(sealed.clone())
    }

    /// Mine all pending transactions in one blocking call.
    /// `Ok(None)` means there was nothing to mine.
    pub fn mine(&mut self) -> Result<Option<Block>, NodeError> {
        let job = match self.prepare_mining() {
            Ok(job) => job,
            Err(NodeError::EmptyPool) => return Ok(None),
            Err(e) => return Err(e),
        };
        let (job, proof) = job.solve();
        Ok(Some(self.commit_mined(job, &proof)?))
    }

    /// Accept a block mined elsewhere. Goes through the same `add_block`
    /// checks as local mining, using the block's own `hash` as the proof.
    pub fn ingest_block(&mut self, block: Block) -> Result<(), RejectReason> {
        let proof = block.hash.clone();
        let index = block.index;
        self.chain.add_block(block, &proof)?;
        info!("accepted external block #{index}");
        Ok(())
    }

    pub fn register_peers<I, S>(&mut self, batch: I) -> Result<usize, NodeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peers.register(batch)
    }

    pub fn dump(&self) -> ChainDump {
        ChainDump {
            length: self.chain.len(),
            chain: self.chain.blocks().to_vec(),
        }
    }

    /// Replace the local chain if `candidate` is strictly longer.
    ///
    /// Transactions sealed only in the discarded blocks go back to the pool;
    /// pending ones the new chain already contains are dropped.
    pub fn adopt_chain(&mut self, candidate: Blockchain) -> bool {
        if candidate.len() <= self.chain.len() {
            return false;
        }
        let (requeued, dropped) = {
            let adopted: HashSet<_> = candidate
                .blocks()
                .iter()
                .flat_map(|b| b.transactions.iter())
                .map(Transaction::identity)
                .collect();
            let orphaned: Vec<Transaction> = self
                .chain
                .blocks()
                .iter()
                .flat_map(|b| b.transactions.iter())
                .filter(|tx| !adopted.contains(&tx.identity()))
                .cloned()
                .collect();
            self.pool
                .requeue(orphaned, |tx| adopted.contains(&tx.identity()))
        };
        info!(
            "replacing local chain ({} blocks) with longer chain ({} blocks); requeued {} orphaned txs, dropped {} already sealed",
            self.chain.len(),
            candidate.len(),
            requeued,
            dropped
        );
        self.chain.replace_with(candidate);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mining_seals_pool_into_next_block() {
        let mut node = LedgerNode::new(2);
        node.submit_transaction(NewTransaction::new("a", "hi")).unwrap();
        node.submit_transaction(NewTransaction::new("b", "yo")).unwrap();

        let block = node.mine().unwrap().expect("block mined");

        assert_eq!(block.index, 1);
        let authors: Vec<_> = block.transactions.iter().map(|t| t.author.as_str()).collect();
        assert_eq!(authors, vec!["a", "b"]);
        assert!(node.pool().is_empty());

        let blocks = node.chain().blocks();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].previous_hash, blocks[0].hash);
        assert!(Blockchain::check_validity(blocks, 2));
    }

    #[test]
    fn mining_empty_pool_is_a_noop() {
        let mut node = LedgerNode::new(2);
        let before = node.dump();
        assert_eq!(node.mine(), Ok(None));
        assert_eq!(node.dump(), before);
    }

    #[test]
    fn missing_field_is_not_queued() {
        let mut node = LedgerNode::new(1);
        let err = node
            .submit_transaction(NewTransaction::new("", "hi"))
            .unwrap_err();
        assert_eq!(err, NodeError::MissingField("author"));
        assert!(node.pool().is_empty());
    }

    #[test]
    fn stale_job_is_rejected_and_pool_kept() {
        let mut node = LedgerNode::new(1);
        node.submit_transaction(NewTransaction::new("a", "first")).unwrap();
        let stale = node.prepare_mining().unwrap();

        // a competing block lands before the stale job commits
        node.mine().unwrap().unwrap();
        node.submit_transaction(NewTransaction::new("b", "second")).unwrap();

        let (stale, proof) = stale.solve();
        assert_eq!(
            node.commit_mined(stale, &proof),
            Err(RejectReason::LinkMismatch)
        );
        assert_eq!(node.chain().len(), 2);
        assert_eq!(node.pool().len(), 1);
    }

    #[test]
    fn submissions_during_mining_stay_pending() {
        let mut node = LedgerNode::new(1);
        node.submit_transaction(NewTransaction::new("a", "x")).unwrap();
        let job = node.prepare_mining().unwrap();
        node.submit_transaction(NewTransaction::new("b", "late")).unwrap();

        let (job, proof) = job.solve();
        node.commit_mined(job, &proof).unwrap();

        let left: Vec<_> = node.pool().iter().map(|t| t.author.as_str()).collect();
        assert_eq!(left, vec!["b"]);
    }

    #[test]
    fn ingest_uses_same_validation_as_mining() {
        let mut miner = LedgerNode::new(1);
        let mut follower = miner.clone();

        miner.submit_transaction(NewTransaction::new("a", "hi")).unwrap();
        let block = miner.mine().unwrap().unwrap();

        let mut forged = block.clone();
        forged.transactions[0].content = "forged".into();
        assert_eq!(follower.ingest_block(forged), Err(RejectReason::InvalidProof));

        follower.ingest_block(block.clone()).unwrap();
        assert_eq!(follower.chain().blocks(), miner.chain().blocks());

        assert_eq!(follower.ingest_block(block), Err(RejectReason::LinkMismatch));
    }

    #[test]
    fn adopt_requires_strictly_longer_chain() {
        let mut node = LedgerNode::new(1);
        let same_length = Blockchain::new(1);
        assert!(!node.adopt_chain(same_length));

        let mut other = LedgerNode::new(1);
        other.submit_transaction(NewTransaction::new("a", "hi")).unwrap();
        other.mine().unwrap();
        assert!(node.adopt_chain(other.chain().clone()));
        assert_eq!(node.chain().len(), 2);
    }

    #[test]
    fn adopting_chain_requeues_orphans_and_drops_duplicates() {
        let mut local = LedgerNode::new(1);
        local
            .submit_transaction(NewTransaction::new("local", "only here"))
            .unwrap();
        local.mine().unwrap().unwrap();

        let mut remote = LedgerNode::new(1);
        let shared = remote
            .submit_transaction(NewTransaction::new("remote", "shared"))
            .unwrap();
        remote.mine().unwrap().unwrap();
        remote
            .submit_transaction(NewTransaction::new("remote", "second"))
            .unwrap();
        remote.mine().unwrap().unwrap();

        local.pool.push(shared);
        local
            .submit_transaction(NewTransaction::new("local", "pending"))
            .unwrap();

        assert!(local.adopt_chain(remote.chain().clone()));

        assert_eq!(local.chain().blocks(), remote.chain().blocks());
        let pending: Vec<_> = local.pool().iter().map(|t| t.content.as_str()).collect();
        assert_eq!(pending, vec!["only here", "pending"]);
    }
}
