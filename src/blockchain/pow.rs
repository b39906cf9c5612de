use super::block::{Block, meets_difficulty};

/// Brute-force Proof-of-Work: start the nonce at zero and count up until the
/// block's hash has `difficulty` leading zeros. Leaves the winning nonce on
/// `block` and returns the matching hash. Blocking and single-threaded.
pub fn proof_of_work(block: &mut Block, difficulty: u32) -> String {
    block.nonce = 0;
    let mut computed = block.recompute_hash();
    while !meets_difficulty(&computed, difficulty) {
        block.nonce = block.nonce.wrapping_add(1);
        computed = block.recompute_hash();
    }
    computed
}
