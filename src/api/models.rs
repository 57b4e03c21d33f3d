use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::blockchain::{Block, Ledger};
use crate::transaction::TransactionKind;

/// Shared application state. The mutex is what keeps a build/append pair
/// from interleaving with another writer.
pub struct AppState {
    pub ledger: Mutex<Ledger>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Mutex::new(ledger),
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: usize,
    pub chain: &'a [Block],
}

#[derive(Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: usize,
}

/* ---------- Block API Models ---------- */

#[derive(Deserialize)]
pub struct NewTransaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub kind: TransactionKind,
}

#[derive(Deserialize)]
pub struct NewBlockRequest {
    pub transactions: Vec<NewTransaction>,
}

#[derive(Serialize, Deserialize)]
pub struct NewBlockResponse {
    pub index: u64,
    pub hash: String,
    pub nonce: u64,
    pub previous_hash: String,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
