//! Proof-of-work search over block nonces.

use crate::blockchain::{Block, Sha256Hash};
use std::time::{Duration, Instant};

/// A SHA-256 hash has 64 hex digits; more leading zeros can never be satisfied.
pub const MAX_DIFFICULTY: u32 = 64;

/// Work spent sealing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningOutcome {
    /// Hashes computed, the initial nonce-0 hash included.
    pub attempts: u64,
    pub elapsed: Duration,
}

/// True when the hex rendering of `hash` starts with `difficulty` `'0'` digits.
pub fn meets_difficulty(hash: &Sha256Hash, difficulty: u32) -> bool {
    let full_bytes = (difficulty / 2) as usize;
    if full_bytes > hash.len() {
        return false;
    }
    if hash[..full_bytes].iter().any(|b| *b != 0) {
        return false;
    }
    if difficulty % 2 == 1 {
        return hash.get(full_bytes).is_some_and(|b| *b >> 4 == 0);
    }
    true
}

/// Increments the nonce until the block hash meets `difficulty`.
///
/// # Panics
///
/// Panics when `difficulty` is 0 or above [`MAX_DIFFICULTY`].
pub fn mine_block(block: &mut Block, difficulty: u32) -> MiningOutcome {
    assert!(
        (1..=MAX_DIFFICULTY).contains(&difficulty),
        "mining difficulty must be between 1 and {}, got {}",
        MAX_DIFFICULTY,
        difficulty
    );

    let start = Instant::now();
    let mut attempts = 1u64;
    while !meets_difficulty(&block.hash, difficulty) {
        block.header.nonce += 1;
        block.hash = block.compute_hash();
        attempts += 1;
    }

    MiningOutcome {
        attempts,
        elapsed: start.elapsed(),
    }
}
