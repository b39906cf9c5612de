use thiserror::Error;

/// Why a block was refused by `Blockchain::add_block`. The chain is left
/// untouched in both cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("previous_hash does not match the chain tip")]
    LinkMismatch,
    #[error("hash fails the difficulty target or does not match the block contents")]
    InvalidProof,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("transaction field `{0}` is missing or empty")]
    MissingField(&'static str),
    #[error("no pending transactions to mine")]
    EmptyPool,
    #[error("chain has no blocks")]
    EmptyChain,
    #[error("peer batch is empty")]
    EmptyPeerBatch,
    #[error("peer {peer} unreachable: {reason}")]
    PeerUnreachable { peer: String, reason: String },
    #[error("peer {peer} sent an unusable chain: {reason}")]
    InvalidPeerChain { peer: String, reason: String },
    #[error("block rejected: {0}")]
    Rejected(#[from] RejectReason),
}
