use async_trait::async_trait;

use super::auto_stop::{AutoStopRule, NewAutoStopRule};
use super::debt_optimization_model::{
    DebtOptimizationStrategy, LedgerEntry, LedgerTotals, NewDebtOptimizationStrategy,
    SimulationSummary,
};
use crate::errors::Result;

/// Trait for strategy, rule and ledger persistence.
#[async_trait]
pub trait DebtOptimizationRepositoryTrait: Send + Sync {
    async fn insert_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy>;

    fn get_strategy(&self, strategy_id: &str) -> Result<DebtOptimizationStrategy>;

    fn list_strategies(&self) -> Result<Vec<DebtOptimizationStrategy>>;

    async fn update_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy>;

    async fn insert_rule(&self, rule: AutoStopRule) -> Result<AutoStopRule>;

    /// Rules in evaluation order. Stored rules with unknown types are skipped.
    fn list_rules(&self, strategy_id: &str) -> Result<Vec<AutoStopRule>>;

    /// Discards the strategy's ledger and stores `entries` in its place,
    /// as one all-or-nothing unit.
    async fn replace_ledger(&self, strategy_id: &str, entries: Vec<LedgerEntry>)
        -> Result<usize>;

    fn list_ledger(&self, strategy_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Aggregates computed by the store in a single pass.
    fn ledger_totals(&self, strategy_id: &str) -> Result<LedgerTotals>;
}

/// Trait for debt optimization operations.
#[async_trait]
pub trait DebtOptimizationServiceTrait: Send + Sync {
    async fn create_strategy(
        &self,
        new_strategy: NewDebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy>;

    fn get_strategy(&self, strategy_id: &str) -> Result<DebtOptimizationStrategy>;

    fn list_strategies(&self) -> Result<Vec<DebtOptimizationStrategy>>;

    /// Rejects unknown rule types and missing thresholds.
    async fn add_auto_stop_rule(&self, new_rule: NewAutoStopRule) -> Result<AutoStopRule>;

    fn list_auto_stop_rules(&self, strategy_id: &str) -> Result<Vec<AutoStopRule>>;

    fn list_ledger(&self, strategy_id: &str) -> Result<Vec<LedgerEntry>>;

    /// Runs the strategy, replaces its ledger and stores the summary.
    async fn simulate(&self, strategy_id: &str) -> Result<SimulationSummary>;
}
