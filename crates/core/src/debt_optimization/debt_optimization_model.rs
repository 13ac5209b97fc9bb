//! Debt optimization domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::debt_optimization_constants::MAX_SIMULATION_MONTHS;
use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrategyType {
    /// Regular amortization of the primary mortgage only
    Baseline,
    /// Baseline plus rental cash flow prepaid within privilege limits
    PrepayOnly,
    /// Readvanceable HELOC draws matching principal repaid, serviced by rental cash flow
    ModifiedSmith,
}

impl StrategyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyType::Baseline => "baseline",
            StrategyType::PrepayOnly => "prepay_only",
            StrategyType::ModifiedSmith => "modified_smith",
        }
    }

    pub fn uses_heloc(&self) -> bool {
        matches!(self, StrategyType::ModifiedSmith)
    }
}

impl fmt::Display for StrategyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "baseline" => Ok(StrategyType::Baseline),
            "prepay_only" => Ok(StrategyType::PrepayOnly),
            "modified_smith" => Ok(StrategyType::ModifiedSmith),
            other => Err(Error::invalid_input(format!(
                "Unknown strategy type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    #[default]
    Draft,
    Simulated,
    Failed,
}

impl StrategyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyStatus::Draft => "draft",
            StrategyStatus::Simulated => "simulated",
            StrategyStatus::Failed => "failed",
        }
    }
}

impl FromStr for StrategyStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "draft" => Ok(StrategyStatus::Draft),
            "simulated" => Ok(StrategyStatus::Simulated),
            "failed" => Ok(StrategyStatus::Failed),
            other => Err(Error::invalid_input(format!(
                "Unknown strategy status '{}'",
                other
            ))),
        }
    }
}

/// A debt-payoff plan over a primary mortgage, an optional HELOC and an
/// optional rental mortgage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DebtOptimizationStrategy {
    pub id: String,
    pub name: String,
    pub strategy_type: StrategyType,
    pub primary_mortgage_account_id: String,
    pub heloc_account_id: Option<String>,
    pub rental_mortgage_account_id: Option<String>,
    pub simulation_months: u32,
    pub rental_income: Decimal,
    pub rental_expenses: Decimal,
    /// Falls back to the configured rate when absent
    pub effective_tax_rate: Option<Decimal>,
    pub total_interest_saved: Option<Decimal>,
    pub total_tax_benefit: Option<Decimal>,
    pub months_accelerated: Option<i64>,
    pub status: StrategyStatus,
    pub last_simulated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDebtOptimizationStrategy {
    pub id: Option<String>,
    pub name: String,
    pub strategy_type: StrategyType,
    pub primary_mortgage_account_id: String,
    pub heloc_account_id: Option<String>,
    pub rental_mortgage_account_id: Option<String>,
    pub simulation_months: u32,
    #[serde(default)]
    pub rental_income: Decimal,
    #[serde(default)]
    pub rental_expenses: Decimal,
    pub effective_tax_rate: Option<Decimal>,
}

impl NewDebtOptimizationStrategy {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.primary_mortgage_account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "primary_mortgage_account_id".to_string(),
            )));
        }
        if self.simulation_months == 0 || self.simulation_months > MAX_SIMULATION_MONTHS {
            return Err(Error::invalid_input(format!(
                "Simulation months must be between 1 and {}",
                MAX_SIMULATION_MONTHS
            )));
        }
        if self.strategy_type.uses_heloc() && self.heloc_account_id.is_none() {
            return Err(Error::invalid_input(format!(
                "Strategy type '{}' requires a HELOC account",
                self.strategy_type
            )));
        }
        if self.rental_income.is_sign_negative() || self.rental_expenses.is_sign_negative() {
            return Err(Error::invalid_input(
                "Rental income and expenses cannot be negative",
            ));
        }
        if self
            .effective_tax_rate
            .is_some_and(|rate| rate.is_sign_negative() || rate > Decimal::ONE)
        {
            return Err(Error::invalid_input(
                "Effective tax rate must be between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// State of every debt at the end of one simulated month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub strategy_id: String,
    /// 1-based month index within the simulation
    pub month_number: u32,
    /// First day of the calendar month simulated
    pub month_date: NaiveDate,
    pub primary_mortgage_balance: Decimal,
    pub heloc_balance: Decimal,
    pub rental_mortgage_balance: Decimal,
    pub primary_payment: Decimal,
    pub primary_interest: Decimal,
    pub primary_principal: Decimal,
    pub heloc_interest: Decimal,
    pub rental_interest: Decimal,
    pub heloc_advance: Decimal,
    pub prepayment: Decimal,
    /// Rental income less expenses and rental mortgage interest
    pub net_rental_cash_flow: Decimal,
    pub tax_benefit: Decimal,
    /// Cumulative HELOC advances put to work
    pub invested_amount: Decimal,
    pub is_stop_month: bool,
}

impl LedgerEntry {
    pub fn total_interest(&self) -> Decimal {
        self.primary_interest + self.heloc_interest + self.rental_interest
    }

    pub fn total_debt(&self) -> Decimal {
        self.primary_mortgage_balance + self.heloc_balance + self.rental_mortgage_balance
    }
}

/// Aggregates over a strategy's ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerTotals {
    pub entry_count: usize,
    pub total_interest: Decimal,
    pub total_heloc_interest: Decimal,
    pub total_tax_benefit: Decimal,
    /// First month the primary mortgage reached zero
    pub payoff_month: Option<u32>,
}

impl LedgerTotals {
    /// Same aggregates computed in memory, for ledgers that are never stored.
    pub fn from_entries(entries: &[LedgerEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut totals, entry| {
            totals.entry_count += 1;
            totals.total_interest += entry.total_interest();
            totals.total_heloc_interest += entry.heloc_interest;
            totals.total_tax_benefit += entry.tax_benefit;
            if totals.payoff_month.is_none() && entry.primary_mortgage_balance.is_zero() {
                totals.payoff_month = Some(entry.month_number);
            }
            totals
        })
    }
}

/// Result of one simulation run, compared against plain amortization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub strategy_id: String,
    pub strategy_type: StrategyType,
    pub months_simulated: usize,
    /// Month at which an auto-stop rule ended the run
    pub stopped_at: Option<u32>,
    pub payoff_month: Option<u32>,
    pub baseline_payoff_month: Option<u32>,
    pub total_interest: Decimal,
    pub baseline_total_interest: Decimal,
    pub total_interest_saved: Decimal,
    pub total_tax_benefit: Decimal,
    pub months_accelerated: i64,
}
