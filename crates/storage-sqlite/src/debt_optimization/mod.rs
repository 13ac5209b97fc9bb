//! SQLite storage implementation for debt optimization strategies,
//! their auto-stop rules and simulation ledgers.

mod model;
mod repository;


pub use model::{AutoStopRuleDB, DebtOptimizationStrategyDB, LedgerEntryDB};
pub use repository::DebtOptimizationRepository;
