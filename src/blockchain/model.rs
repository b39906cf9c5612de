use log::debug;

use super::Block;
use super::block::meets_difficulty;
use crate::error::{NodeError, RejectReason};
use crate::transaction::unix_now;

/// In-memory ledger anchored by a genesis block. Blocks only enter through
/// `add_block`; the whole chain can be swapped by `replace_with`.
#[derive(Debug, Clone)]
pub struct Blockchain {
    blocks: Vec<Block>,
    difficulty: u32,
}

impl Blockchain {
    /// Initialize a new blockchain holding only a freshly sealed genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self {
            blocks: vec![Block::genesis(unix_now())],
            difficulty,
        }
    }

    /// Rebuild a chain from externally sourced blocks. `None` unless the
    /// sequence passes `check_validity` under `difficulty`.
    pub fn from_blocks(blocks: Vec<Block>, difficulty: u32) -> Option<Self> {
        if Self::check_validity(&blocks, difficulty) {
            Some(Self { blocks, difficulty })
        } else {
            None
        }
    }

    pub fn last_block(&self) -> Result<&Block, NodeError> {
        self.blocks.last().ok_or(NodeError::EmptyChain)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// Append `candidate` sealed with `proof`. The block must extend the tip
    /// (linkage and next index) and `proof` must pass `is_valid_proof`.
    pub fn add_block(&mut self, mut candidate: Block, proof: &str) -> Result<(), RejectReason> {
        let tip = self.last_block().map_err(|_| RejectReason::LinkMismatch)?;
        if candidate.previous_hash != tip.hash || candidate.index != tip.index + 1 {
            debug!(
                "reject block #{}: expected previous_hash={} index={}",
                candidate.index,
                tip.hash,
                tip.index + 1
            );
            return Err(RejectReason::LinkMismatch);
        }
        if !self.is_valid_proof(&candidate, proof) {
            debug!("reject block #{}: invalid proof {}", candidate.index, proof);
            return Err(RejectReason::InvalidProof);
        }
        candidate.hash = proof.to_string();
        self.blocks.push(candidate);
        Ok(())
    }

    /// `claimed_hash` meets the difficulty and equals the block's recomputed
    /// digest at its current nonce.
    pub fn is_valid_proof(&self, block: &Block, claimed_hash: &str) -> bool {
        Self::proof_holds(block, claimed_hash, self.difficulty)
    }

    fn proof_holds(block: &Block, claimed_hash: &str, difficulty: u32) -> bool {
        meets_difficulty(claimed_hash, difficulty) && claimed_hash == block.recompute_hash()
    }

    /// Walk a candidate chain from genesis. Every block's digest is recomputed
    /// from its fields; the embedded `hash` is only trusted after it matches.
    /// Any bad block fails the whole sequence.
    pub fn check_validity(blocks: &[Block], difficulty: u32) -> bool {
        let Some((genesis, rest)) = blocks.split_first() else {
            return false;
        };
        if !genesis.is_genesis()
            || genesis.previous_hash != "0"
            || !genesis.transactions.is_empty()
            || genesis.hash != genesis.recompute_hash()
        {
            return false;
        }

        let mut previous = genesis;
        for block in rest {
            if block.index != previous.index + 1
                || block.previous_hash != previous.hash
                || !Self::proof_holds(block, &block.hash, difficulty)
            {
                return false;
            }
            previous = block;
        }
        true
    }

    /// Swap in `other` wholesale. The old blocks are dropped, never merged.
    pub fn replace_with(&mut self, other: Blockchain) {
        *self = other;
    }
}
