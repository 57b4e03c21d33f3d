use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

/// Where a transfer is settled. Drives the fee rate picked by the contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Domestic,
    International,
}

/// A monetary transfer between two parties.
///
/// `from`, `to` and `kind` never change. `amount` and `fee` are rewritten
/// once by the contract pipeline when the owning block is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    from: String,
    to: String,
    amount: f64,
    fee: f64,
    kind: TransactionKind,
}

impl Transaction {
    /// Build a transaction with a zero fee. Negative or non-finite amounts are rejected.
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: f64,
        kind: TransactionKind,
    ) -> Result<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(LedgerError::InvalidAmount(amount));
        }
        Ok(Self {
            from: from.into(),
            to: to.into(),
            amount,
            fee: 0.0,
            kind,
        })
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Move `fee` out of the transferred amount into the fee field.
    pub fn charge_fee(&mut self, fee: f64) {
        self.fee += fee;
        self.amount -= fee;
    }

    /// Deterministic encoding used as hashing input. Fields are written in
    /// declaration order: from, to, amount, fee, kind.
    pub fn canonical_string(&self) -> String {
        serde_json::to_string(self).expect("serialize transaction")
    }
}
