pub mod contract;
pub mod model;

pub use contract::{ContractPipeline, FeeSchedule, SmartContract};
pub use model::{Transaction, TransactionKind};
