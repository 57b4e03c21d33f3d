use log::debug;
use serde::Serialize;

use super::block::{Block, PendingBlock, hash_key};
use super::{DEFAULT_DIFFICULTY, DEFAULT_MAX_SEAL_ITERATIONS};
use crate::error::{LedgerError, Result};

/// Proof-of-Work target: the hex hash must start with `leading_zeros` '0' characters.
///
/// This is a character prefix, not a bit count, so it is deliberately coarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Difficulty {
    pub leading_zeros: usize,
}

impl Difficulty {
    pub fn new(leading_zeros: usize) -> Self {
        Self { leading_zeros }
    }

    /// Accepts every hash.
    pub fn trivial() -> Self {
        Self { leading_zeros: 0 }
    }

    pub fn is_satisfied_by(&self, hash: &str) -> bool {
        hash.len() >= self.leading_zeros
            && hash.chars().take(self.leading_zeros).all(|c| c == '0')
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::new(DEFAULT_DIFFICULTY)
    }
}

/// Finds a nonce whose block hash satisfies the difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashSealer {
    pub difficulty: Difficulty,
    /// Hash attempts allowed before giving up with `SealingTimeout`.
    pub max_iterations: u64,
}

impl HashSealer {
    pub fn new(difficulty: Difficulty, max_iterations: u64) -> Self {
        Self {
            difficulty,
            max_iterations,
        }
    }

    /// Hash the block key, bumping the nonce until the difficulty is met.
    /// The search starts from the block's current nonce and the winning
    /// nonce is kept on the sealed block.
    pub fn seal(&self, mut pending: PendingBlock) -> Result<Block> {
        let mut attempts: u64 = 0;
        while attempts < self.max_iterations {
            attempts += 1;
            let hash = hash_key(&pending.key());
            if self.difficulty.is_satisfied_by(&hash) {
                debug!(
                    "SEAL - block #{} sealed (nonce={}, attempts={})",
                    pending.index, pending.nonce, attempts
                );
                return Ok(Block::from_sealed(pending, hash));
            }
            pending.nonce = match pending.nonce.checked_add(1) {
                Some(n) => n,
                None => break,
            };
        }
        Err(LedgerError::SealingTimeout {
            index: pending.index,
            attempts,
        })
    }

    /// Check that a sealed block's hash matches its content and meets the difficulty.
    pub fn verify(&self, block: &Block) -> Result<()> {
        let expected = block.compute_hash();
        if block.hash() != expected {
            return Err(LedgerError::InvalidSeal {
                index: block.index(),
                reason: format!("stored hash {} != recomputed {}", block.hash(), expected),
            });
        }
        if !self.difficulty.is_satisfied_by(block.hash()) {
            return Err(LedgerError::InvalidSeal {
                index: block.index(),
                reason: format!(
                    "hash {} does not start with {} zeros",
                    block.hash(),
                    self.difficulty.leading_zeros
                ),
            });
        }
        Ok(())
    }
}

impl Default for HashSealer {
    fn default() -> Self {
        Self::new(Difficulty::default(), DEFAULT_MAX_SEAL_ITERATIONS)
    }
}
