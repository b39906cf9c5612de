pub mod block;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Blockchain;
pub use pow::proof_of_work;

/// Default Proof-of-Work difficulty (number of leading hex zeros).
pub const DEFAULT_DIFFICULTY: u32 = 2;

/// Upper bound accepted from configuration; each step costs 16x more work.
pub const DIFF_MAX: u32 = 6;
