use thiserror::Error;

/// Errors surfaced by the ledger core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("invalid genesis block: {0}")]
    InvalidGenesis(String),

    #[error("chain has no genesis block")]
    EmptyChain,

    #[error(
        "chain linkage violation: expected index {expected_index} after {expected_previous_hash}, \
         got index {actual_index} after {actual_previous_hash}"
    )]
    ChainLinkageViolation {
        expected_index: u64,
        actual_index: u64,
        expected_previous_hash: String,
        actual_previous_hash: String,
    },

    #[error("sealing block #{index} gave up after {attempts} attempts")]
    SealingTimeout { index: u64, attempts: u64 },

    #[error("block #{index} has an invalid seal: {reason}")]
    InvalidSeal { index: u64, reason: String },

    #[error("invalid transaction amount: {0}")]
    InvalidAmount(f64),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
