//! Database models for debt optimization.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use std::str::FromStr;

use wealthcast_core::debt_optimization::{
    AutoStopRule, DebtOptimizationStrategy, LedgerEntry, StrategyStatus, StrategyType,
};
use wealthcast_core::Result;

use crate::errors::StorageError;
use crate::utils::{optional_decimal_to_string, parse_decimal, parse_optional_decimal};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::debt_optimization_strategies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DebtOptimizationStrategyDB {
    pub id: String,
    pub name: String,
    pub strategy_type: String,
    pub primary_mortgage_account_id: String,
    pub heloc_account_id: Option<String>,
    pub rental_mortgage_account_id: Option<String>,
    pub simulation_months: i32,
    pub rental_income: String,
    pub rental_expenses: String,
    pub effective_tax_rate: Option<String>,
    pub total_interest_saved: Option<String>,
    pub total_tax_benefit: Option<String>,
    pub months_accelerated: Option<i64>,
    pub status: String,
    pub last_simulated_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<DebtOptimizationStrategyDB> for DebtOptimizationStrategy {
    type Error = wealthcast_core::Error;

    fn try_from(db: DebtOptimizationStrategyDB) -> Result<Self> {
        Ok(Self {
            strategy_type: StrategyType::from_str(&db.strategy_type)?,
            status: StrategyStatus::from_str(&db.status)?,
            simulation_months: u32::try_from(db.simulation_months).map_err(|_| {
                StorageError::InvalidValue(format!(
                    "strategy {} has {} simulation months",
                    db.id, db.simulation_months
                ))
            })?,
            rental_income: parse_decimal(&db.rental_income, "rental_income"),
            rental_expenses: parse_decimal(&db.rental_expenses, "rental_expenses"),
            effective_tax_rate: parse_optional_decimal(
                db.effective_tax_rate.as_deref(),
                "effective_tax_rate",
            ),
            total_interest_saved: parse_optional_decimal(
                db.total_interest_saved.as_deref(),
                "total_interest_saved",
            ),
            total_tax_benefit: parse_optional_decimal(
                db.total_tax_benefit.as_deref(),
                "total_tax_benefit",
            ),
            id: db.id,
            name: db.name,
            primary_mortgage_account_id: db.primary_mortgage_account_id,
            heloc_account_id: db.heloc_account_id,
            rental_mortgage_account_id: db.rental_mortgage_account_id,
            months_accelerated: db.months_accelerated,
            last_simulated_at: db.last_simulated_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<DebtOptimizationStrategy> for DebtOptimizationStrategyDB {
    fn from(domain: DebtOptimizationStrategy) -> Self {
        Self {
            id: domain.id,
            name: domain.name,
            strategy_type: domain.strategy_type.as_str().to_string(),
            primary_mortgage_account_id: domain.primary_mortgage_account_id,
            heloc_account_id: domain.heloc_account_id,
            rental_mortgage_account_id: domain.rental_mortgage_account_id,
            simulation_months: i32::try_from(domain.simulation_months).unwrap_or(i32::MAX),
            rental_income: domain.rental_income.to_string(),
            rental_expenses: domain.rental_expenses.to_string(),
            effective_tax_rate: optional_decimal_to_string(domain.effective_tax_rate),
            total_interest_saved: optional_decimal_to_string(domain.total_interest_saved),
            total_tax_benefit: optional_decimal_to_string(domain.total_tax_benefit),
            months_accelerated: domain.months_accelerated,
            status: domain.status.as_str().to_string(),
            last_simulated_at: domain.last_simulated_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

/// Rule row. `rule_type` stays raw text so rows written by newer versions
/// can be skipped instead of failing the whole load.
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::auto_stop_rules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AutoStopRuleDB {
    pub id: String,
    pub strategy_id: String,
    pub rule_type: String,
    pub threshold_value: Option<String>,
    pub threshold_unit: String,
    pub enabled: bool,
    pub position: i32,
}

impl From<AutoStopRule> for AutoStopRuleDB {
    fn from(domain: AutoStopRule) -> Self {
        Self {
            id: domain.id,
            strategy_id: domain.strategy_id,
            rule_type: domain.rule_type.as_str().to_string(),
            threshold_value: optional_decimal_to_string(domain.threshold_value),
            threshold_unit: domain.threshold_unit.as_str().to_string(),
            enabled: domain.enabled,
            position: domain.position,
        }
    }
}

#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::debt_optimization_ledger_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct LedgerEntryDB {
    pub strategy_id: String,
    pub month_number: i32,
    pub month_date: NaiveDate,
    pub primary_mortgage_balance: String,
    pub heloc_balance: String,
    pub rental_mortgage_balance: String,
    pub primary_payment: String,
    pub primary_interest: String,
    pub primary_principal: String,
    pub heloc_interest: String,
    pub rental_interest: String,
    pub heloc_advance: String,
    pub prepayment: String,
    pub net_rental_cash_flow: String,
    pub tax_benefit: String,
    pub invested_amount: String,
    pub is_stop_month: bool,
}

impl From<LedgerEntry> for LedgerEntryDB {
    fn from(domain: LedgerEntry) -> Self {
        Self {
            strategy_id: domain.strategy_id,
            month_number: i32::try_from(domain.month_number).unwrap_or(i32::MAX),
            month_date: domain.month_date,
            primary_mortgage_balance: domain.primary_mortgage_balance.to_string(),
            heloc_balance: domain.heloc_balance.to_string(),
            rental_mortgage_balance: domain.rental_mortgage_balance.to_string(),
            primary_payment: domain.primary_payment.to_string(),
            primary_interest: domain.primary_interest.to_string(),
            primary_principal: domain.primary_principal.to_string(),
            heloc_interest: domain.heloc_interest.to_string(),
            rental_interest: domain.rental_interest.to_string(),
            heloc_advance: domain.heloc_advance.to_string(),
            prepayment: domain.prepayment.to_string(),
            net_rental_cash_flow: domain.net_rental_cash_flow.to_string(),
            tax_benefit: domain.tax_benefit.to_string(),
            invested_amount: domain.invested_amount.to_string(),
            is_stop_month: domain.is_stop_month,
        }
    }
}

impl From<LedgerEntryDB> for LedgerEntry {
    fn from(db: LedgerEntryDB) -> Self {
        Self {
            month_number: u32::try_from(db.month_number).unwrap_or_default(),
            month_date: db.month_date,
            primary_mortgage_balance: parse_decimal(
                &db.primary_mortgage_balance,
                "primary_mortgage_balance",
            ),
            heloc_balance: parse_decimal(&db.heloc_balance, "heloc_balance"),
            rental_mortgage_balance: parse_decimal(
                &db.rental_mortgage_balance,
                "rental_mortgage_balance",
            ),
            primary_payment: parse_decimal(&db.primary_payment, "primary_payment"),
            primary_interest: parse_decimal(&db.primary_interest, "primary_interest"),
            primary_principal: parse_decimal(&db.primary_principal, "primary_principal"),
            heloc_interest: parse_decimal(&db.heloc_interest, "heloc_interest"),
            rental_interest: parse_decimal(&db.rental_interest, "rental_interest"),
            heloc_advance: parse_decimal(&db.heloc_advance, "heloc_advance"),
            prepayment: parse_decimal(&db.prepayment, "prepayment"),
            net_rental_cash_flow: parse_decimal(&db.net_rental_cash_flow, "net_rental_cash_flow"),
            tax_benefit: parse_decimal(&db.tax_benefit, "tax_benefit"),
            invested_amount: parse_decimal(&db.invested_amount, "invested_amount"),
            strategy_id: db.strategy_id,
            is_stop_month: db.is_stop_month,
        }
    }
}
