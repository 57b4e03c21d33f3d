use std::env;

use crate::blockchain::{DEFAULT_DIFFICULTY, DEFAULT_MAX_SEAL_ITERATIONS, Difficulty, HashSealer};

/// Runtime settings, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// LEDGER_DIFFICULTY: leading '0' characters required of a block hash.
    pub difficulty: usize,
    /// LEDGER_MAX_SEAL_ITERATIONS: nonce attempts before sealing gives up.
    pub max_seal_iterations: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            difficulty: DEFAULT_DIFFICULTY,
            max_seal_iterations: DEFAULT_MAX_SEAL_ITERATIONS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. Missing or unparseable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: lookup("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            difficulty: lookup("LEDGER_DIFFICULTY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.difficulty),
            max_seal_iterations: lookup("LEDGER_MAX_SEAL_ITERATIONS")
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_seal_iterations),
        }
    }

    pub fn sealer(&self) -> HashSealer {
        HashSealer::new(Difficulty::new(self.difficulty), self.max_seal_iterations)
    }
}
