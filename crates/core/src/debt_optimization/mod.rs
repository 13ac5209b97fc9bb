//! Debt optimization module - strategy simulation, auto-stop rules and ledgers.

mod auto_stop;
mod debt_optimization_constants;
mod debt_optimization_model;
mod debt_optimization_service;
mod debt_optimization_traits;
mod simulator;

#[cfg(test)]
mod simulator_tests;

pub use auto_stop::{
    first_triggered, AutoStopRule, AutoStopRuleType, NewAutoStopRule, RuleContext, ThresholdUnit,
};
pub use debt_optimization_constants::*;
pub use debt_optimization_model::{
    DebtOptimizationStrategy, LedgerEntry, LedgerTotals, NewDebtOptimizationStrategy,
    SimulationSummary, StrategyStatus, StrategyType,
};
pub use debt_optimization_service::DebtOptimizationService;
pub use debt_optimization_traits::{DebtOptimizationRepositoryTrait, DebtOptimizationServiceTrait};
pub use simulator::{
    DebtSimulator, HelocTerms, LoanTerms, SimulationConfig, SimulationInputs, SimulationOutcome,
};
