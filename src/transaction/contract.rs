use std::fmt;

use super::model::{Transaction, TransactionKind};

/// A transform run over every transaction of a block before it is sealed.
pub trait SmartContract: Send + Sync {
    fn name(&self) -> &str;

    /// Rewrite `fee`/`amount` of `tx` in place.
    fn apply(&self, tx: &mut Transaction);
}

/// Percentage fee keyed by transaction kind: `fee = amount * rate`, `amount -= fee`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub domestic: f64,
    pub international: f64,
}

impl FeeSchedule {
    pub fn rate(&self, kind: TransactionKind) -> f64 {
        match kind {
            TransactionKind::Domestic => self.domestic,
            TransactionKind::International => self.international,
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            domestic: 0.02,
            international: 0.05,
        }
    }
}

impl SmartContract for FeeSchedule {
    fn name(&self) -> &str {
        "fee-schedule"
    }

    fn apply(&self, tx: &mut Transaction) {
        let fee = tx.amount() * self.rate(tx.kind());
        tx.charge_fee(fee);
    }
}

/// Ordered list of contracts owned by a ledger.
///
/// `ContractPipeline::new()` is empty and leaves transactions untouched;
/// `ContractPipeline::default()` carries the standard [`FeeSchedule`].
pub struct ContractPipeline {
    contracts: Vec<Box<dyn SmartContract>>,
}

impl ContractPipeline {
    pub fn new() -> Self {
        Self {
            contracts: Vec::new(),
        }
    }

    /// Append a contract; it runs after every contract registered before it.
    pub fn register(mut self, contract: impl SmartContract + 'static) -> Self {
        self.contracts.push(Box::new(contract));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.contracts.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Run each contract, in registration order, over each transaction exactly once.
    pub fn apply_all(&self, transactions: &mut [Transaction]) {
        for contract in &self.contracts {
            for tx in transactions.iter_mut() {
                contract.apply(tx);
            }
        }
    }
}

impl Default for ContractPipeline {
    fn default() -> Self {
        Self::new().register(FeeSchedule::default())
    }
}

impl fmt::Debug for ContractPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractPipeline")
            .field("contracts", &self.names())
            .finish()
    }
}
