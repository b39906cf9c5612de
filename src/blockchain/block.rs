use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::transaction::Transaction;

/// A block on the ledger. Candidates are built with an empty `hash`; the
/// hash is filled in once the block is sealed (genesis) or appended to a
/// chain with a verified proof.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub timestamp: f64, // Unix seconds
    pub previous_hash: String,
    pub nonce: u64, // Proof-of-Work nonce
    #[serde(default)]
    pub hash: String,
}

/// Canonical hashing view of a block: every field except `hash`, keys in
/// alphabetical order, serialized as compact JSON.
#[derive(Serialize)]
struct HashableBlock<'a> {
    index: u64,
    nonce: u64,
    previous_hash: &'a str,
    timestamp: f64,
    transactions: &'a [Transaction],
}

impl Block {
    /// Build an unsealed candidate with `nonce = 0`.
    pub fn candidate(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: f64,
        previous_hash: String,
    ) -> Self {
        Self {
            index,
            transactions,
            timestamp,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// Build a block and seal it with the digest of its own fields.
    pub fn seal(
        index: u64,
        transactions: Vec<Transaction>,
        timestamp: f64,
        previous_hash: String,
    ) -> Self {
        let mut block = Self::candidate(index, transactions, timestamp, previous_hash);
        block.hash = block.recompute_hash();
        block
    }

    /// The index-0 root block.
    pub fn genesis(timestamp: f64) -> Self {
        Self::seal(0, Vec::new(), timestamp, String::from("0"))
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Bytes that every node hashes for this block.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let view = HashableBlock {
            index: self.index,
            nonce: self.nonce,
            previous_hash: &self.previous_hash,
            timestamp: self.timestamp,
            transactions: &self.transactions,
        };
        serde_json::to_vec(&view).expect("hashable block serializes")
    }

    /// SHA-512 of the canonical bytes, hex-encoded. Never reads `self.hash`.
    pub fn recompute_hash(&self) -> String {
        let mut hasher = Sha512::new();
        hasher.update(self.canonical_bytes());
        hex::encode(hasher.finalize())
    }
}

/// True when `hash` starts with `difficulty` `'0'` characters.
pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
    let difficulty = difficulty as usize;
    hash.len() >= difficulty && hash.bytes().take(difficulty).all(|b| b == b'0')
}
