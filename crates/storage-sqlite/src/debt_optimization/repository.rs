use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Integer, Nullable, Text};
use log::{debug, warn};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use wealthcast_core::constants::DISPLAY_DECIMAL_PRECISION;
use wealthcast_core::debt_optimization::{
    AutoStopRule, AutoStopRuleType, DebtOptimizationRepositoryTrait, DebtOptimizationStrategy,
    LedgerEntry, LedgerTotals,
};
use wealthcast_core::Result;

use super::model::{AutoStopRuleDB, DebtOptimizationStrategyDB, LedgerEntryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{auto_stop_rules, debt_optimization_ledger_entries, debt_optimization_strategies};
use crate::utils::{chunk_for_sqlite, parse_optional_decimal};

pub struct DebtOptimizationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DebtOptimizationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[derive(QueryableByName, Debug)]
struct LedgerTotalsRow {
    #[diesel(sql_type = BigInt)]
    entry_count: i64,
    #[diesel(sql_type = Double)]
    total_interest: f64,
    #[diesel(sql_type = Double)]
    total_heloc_interest: f64,
    #[diesel(sql_type = Double)]
    total_tax_benefit: f64,
    #[diesel(sql_type = Nullable<Integer>)]
    payoff_month: Option<i32>,
}

fn money(value: f64) -> Decimal {
    Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp(DISPLAY_DECIMAL_PRECISION)
}

fn rule_from_row(row: AutoStopRuleDB) -> Option<AutoStopRule> {
    let Some(rule_type) = AutoStopRuleType::parse_lenient(&row.rule_type) else {
        warn!(
            "Skipping auto-stop rule {} with unknown type '{}'",
            row.id, row.rule_type
        );
        return None;
    };
    let threshold_unit = row
        .threshold_unit
        .parse()
        .unwrap_or_else(|_| rule_type.default_unit());
    Some(AutoStopRule {
        threshold_value: parse_optional_decimal(row.threshold_value.as_deref(), "threshold_value"),
        id: row.id,
        strategy_id: row.strategy_id,
        rule_type,
        threshold_unit,
        enabled: row.enabled,
        position: row.position,
    })
}

#[async_trait]
impl DebtOptimizationRepositoryTrait for DebtOptimizationRepository {
    async fn insert_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy> {
        self.writer
            .exec(move |conn| -> Result<DebtOptimizationStrategy> {
                let row = diesel::insert_into(debt_optimization_strategies::table)
                    .values(DebtOptimizationStrategyDB::from(strategy))
                    .returning(DebtOptimizationStrategyDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                row.try_into()
            })
            .await
    }

    fn get_strategy(&self, strategy_id: &str) -> Result<DebtOptimizationStrategy> {
        let mut conn = get_connection(&self.pool)?;
        debt_optimization_strategies::table
            .find(strategy_id)
            .select(DebtOptimizationStrategyDB::as_select())
            .first::<DebtOptimizationStrategyDB>(&mut conn)
            .map_err(StorageError::from)?
            .try_into()
    }

    fn list_strategies(&self) -> Result<Vec<DebtOptimizationStrategy>> {
        let mut conn = get_connection(&self.pool)?;
        debt_optimization_strategies::table
            .select(DebtOptimizationStrategyDB::as_select())
            .order(debt_optimization_strategies::created_at.asc())
            .load::<DebtOptimizationStrategyDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(DebtOptimizationStrategy::try_from)
            .collect()
    }

    async fn update_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy> {
        self.writer
            .exec(move |conn| -> Result<DebtOptimizationStrategy> {
                let row = DebtOptimizationStrategyDB::from(strategy);
                let updated = diesel::update(debt_optimization_strategies::table.find(&row.id))
                    .set((
                        debt_optimization_strategies::name.eq(&row.name),
                        debt_optimization_strategies::strategy_type.eq(&row.strategy_type),
                        debt_optimization_strategies::primary_mortgage_account_id
                            .eq(&row.primary_mortgage_account_id),
                        debt_optimization_strategies::heloc_account_id.eq(&row.heloc_account_id),
                        debt_optimization_strategies::rental_mortgage_account_id
                            .eq(&row.rental_mortgage_account_id),
                        debt_optimization_strategies::simulation_months.eq(row.simulation_months),
                        debt_optimization_strategies::rental_income.eq(&row.rental_income),
                        debt_optimization_strategies::rental_expenses.eq(&row.rental_expenses),
                        debt_optimization_strategies::effective_tax_rate
                            .eq(&row.effective_tax_rate),
                        debt_optimization_strategies::total_interest_saved
                            .eq(&row.total_interest_saved),
                        debt_optimization_strategies::total_tax_benefit.eq(&row.total_tax_benefit),
                        debt_optimization_strategies::months_accelerated
                            .eq(row.months_accelerated),
                        debt_optimization_strategies::status.eq(&row.status),
                        debt_optimization_strategies::last_simulated_at.eq(row.last_simulated_at),
                        debt_optimization_strategies::updated_at.eq(row.updated_at),
                    ))
                    .returning(DebtOptimizationStrategyDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                updated.try_into()
            })
            .await
    }

    async fn insert_rule(&self, rule: AutoStopRule) -> Result<AutoStopRule> {
        self.writer
            .exec(move |conn| -> Result<AutoStopRule> {
                diesel::insert_into(auto_stop_rules::table)
                    .values(AutoStopRuleDB::from(rule.clone()))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(rule)
            })
            .await
    }

    fn list_rules(&self, strategy_id: &str) -> Result<Vec<AutoStopRule>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = auto_stop_rules::table
            .filter(auto_stop_rules::strategy_id.eq(strategy_id))
            .select(AutoStopRuleDB::as_select())
            .order((auto_stop_rules::position.asc(), auto_stop_rules::id.asc()))
            .load::<AutoStopRuleDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().filter_map(rule_from_row).collect())
    }

    async fn replace_ledger(&self, strategy_id: &str, entries: Vec<LedgerEntry>) -> Result<usize> {
        let strategy_id = strategy_id.to_string();
        self.writer
            .exec(move |conn| -> Result<usize> {
                let deleted = diesel::delete(
                    debt_optimization_ledger_entries::table
                        .filter(debt_optimization_ledger_entries::strategy_id.eq(&strategy_id)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let rows: Vec<LedgerEntryDB> = entries.into_iter().map(LedgerEntryDB::from).collect();
                let mut inserted = 0;
                for chunk in chunk_for_sqlite(&rows) {
                    inserted += diesel::insert_into(debt_optimization_ledger_entries::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                debug!(
                    "Replaced {} ledger entries with {} for strategy {}",
                    deleted, inserted, strategy_id
                );
                Ok(inserted)
            })
            .await
    }

    fn list_ledger(&self, strategy_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = debt_optimization_ledger_entries::table
            .filter(debt_optimization_ledger_entries::strategy_id.eq(strategy_id))
            .select(LedgerEntryDB::as_select())
            .order(debt_optimization_ledger_entries::month_number.asc())
            .load::<LedgerEntryDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(LedgerEntry::from).collect())
    }

    fn ledger_totals(&self, strategy_id: &str) -> Result<LedgerTotals> {
        let mut conn = get_connection(&self.pool)?;
        let row: LedgerTotalsRow = diesel::sql_query(
            r#"
            SELECT
                COUNT(*) AS entry_count,
                COALESCE(SUM(CAST(primary_interest AS REAL)
                    + CAST(heloc_interest AS REAL)
                    + CAST(rental_interest AS REAL)), 0.0) AS total_interest,
                COALESCE(SUM(CAST(heloc_interest AS REAL)), 0.0) AS total_heloc_interest,
                COALESCE(SUM(CAST(tax_benefit AS REAL)), 0.0) AS total_tax_benefit,
                MIN(CASE WHEN CAST(primary_mortgage_balance AS REAL) = 0
                    THEN month_number END) AS payoff_month
            FROM debt_optimization_ledger_entries
            WHERE strategy_id = ?1
            "#,
        )
        .bind::<Text, _>(strategy_id)
        .get_result(&mut conn)
        .map_err(StorageError::from)?;

        Ok(LedgerTotals {
            entry_count: usize::try_from(row.entry_count).unwrap_or_default(),
            total_interest: money(row.total_interest),
            total_heloc_interest: money(row.total_heloc_interest),
            total_tax_benefit: money(row.total_tax_benefit),
            payoff_month: row.payoff_month.and_then(|m| u32::try_from(m).ok()),
        })
    }
}
