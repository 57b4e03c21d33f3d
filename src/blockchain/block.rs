use serde::Serialize;
use sha2::{Digest, Sha256};

use super::GENESIS_PREVIOUS_HASH;
use crate::transaction::Transaction;

/// Canonical key of a block: index, previous hash, nonce and every
/// transaction's canonical string, concatenated in that order.
fn block_key(index: u64, previous_hash: &str, nonce: u64, transactions: &[Transaction]) -> String {
    let mut key = format!("{index}{previous_hash}{nonce}");
    for tx in transactions {
        key.push_str(&tx.canonical_string());
    }
    key
}

/// SHA-256 of `key`, hex encoded.
pub fn hash_key(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}

/// A block still being assembled. Has no hash; turn it into a [`Block`]
/// with [`HashSealer::seal`](super::HashSealer::seal).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingBlock {
    pub index: u64,
    pub previous_hash: String,
    pub nonce: u64,
    pub transactions: Vec<Transaction>,
}

impl PendingBlock {
    pub fn new(index: u64, previous_hash: impl Into<String>) -> Self {
        Self {
            index,
            previous_hash: previous_hash.into(),
            nonce: 0,
            transactions: Vec::new(),
        }
    }

    /// Empty genesis candidate pointing at the all-zero sentinel.
    pub fn genesis() -> Self {
        Self::new(0, GENESIS_PREVIOUS_HASH)
    }

    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn key(&self) -> String {
        block_key(self.index, &self.previous_hash, self.nonce, &self.transactions)
    }
}

/// A sealed block. Only the sealer creates these, and nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    index: u64,
    previous_hash: String,
    nonce: u64,
    hash: String,
    transactions: Vec<Transaction>,
}

impl Block {
    pub(crate) fn from_sealed(pending: PendingBlock, hash: String) -> Self {
        Self {
            index: pending.index,
            previous_hash: pending.previous_hash,
            nonce: pending.nonce,
            hash,
            transactions: pending.transactions,
        }
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn previous_hash(&self) -> &str {
        &self.previous_hash
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn key(&self) -> String {
        block_key(self.index, &self.previous_hash, self.nonce, &self.transactions)
    }

    /// Recompute the hash from the current fields (ignores the stored `hash`).
    pub fn compute_hash(&self) -> String {
        hash_key(&self.key())
    }
}
