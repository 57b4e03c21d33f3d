pub mod block;
pub mod model;
pub mod sealer;

pub use block::{Block, PendingBlock};
pub use model::Ledger;
pub use sealer::{Difficulty, HashSealer};

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0000000000000000";

/// Default Proof-of-Work difficulty (leading '0' characters of the hex hash).
pub const DEFAULT_DIFFICULTY: usize = 2;

/// Nonce attempts before sealing gives up.
pub const DEFAULT_MAX_SEAL_ITERATIONS: u64 = 5_000_000;
