//! In-memory repositories shared by the service tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::accounts::{Account, AccountRepositoryTrait, BalancePoint, LoanDetails, NewAccount};
use crate::debt_optimization::{
    AutoStopRule, DebtOptimizationRepositoryTrait, DebtOptimizationStrategy, LedgerEntry,
    LedgerTotals,
};
use crate::errors::{DatabaseError, Error, Result};
use crate::milestones::{Milestone, MilestoneRepositoryTrait};
use crate::projections::{
    AssumptionRepositoryTrait, NewProjection, NewProjectionAssumption, Projection,
    ProjectionAssumption, ProjectionRepositoryTrait,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn account(id: &str, account_type: &str, balance: Decimal) -> Account {
    Account {
        id: id.to_string(),
        name: format!("Account {}", id),
        account_type: account_type.to_string(),
        currency: "CAD".to_string(),
        balance,
        is_active: true,
        loan: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn loan_account(
    id: &str,
    account_type: &str,
    balance: Decimal,
    annual_rate: Decimal,
    term_months: u32,
) -> Account {
    Account {
        loan: Some(LoanDetails {
            annual_rate: Some(annual_rate),
            term_months: Some(term_months),
            original_principal: Some(balance.abs()),
            ..LoanDetails::default()
        }),
        ..account(id, account_type, balance)
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockAccountRepository {
    accounts: Mutex<HashMap<String, Account>>,
    history: Mutex<Vec<(String, BalancePoint)>>,
}

impl MockAccountRepository {
    pub fn with_accounts(accounts: Vec<Account>) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut map = repo.accounts.lock().unwrap();
            for account in accounts {
                map.insert(account.id.clone(), account);
            }
        }
        Arc::new(repo)
    }

    pub fn add_history(&self, account_id: &str, date: NaiveDate, balance: Decimal) {
        self.history
            .lock()
            .unwrap()
            .push((account_id.to_string(), BalancePoint { date, balance }));
    }
}

#[async_trait]
impl AccountRepositoryTrait for MockAccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        let created = Account {
            id: new_account
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_account.name,
            account_type: new_account.account_type,
            currency: new_account.currency,
            balance: new_account.balance,
            is_active: new_account.is_active,
            loan: new_account.loan,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn update_balance(
        &self,
        account_id: &str,
        balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<Account> {
        let updated = {
            let mut accounts = self.accounts.lock().unwrap();
            let account = accounts.get_mut(account_id).ok_or_else(|| {
                Error::Database(DatabaseError::NotFound(account_id.to_string()))
            })?;
            account.balance = balance;
            account.clone()
        };
        let mut history = self.history.lock().unwrap();
        history.retain(|(id, point)| !(id == account_id && point.date == as_of));
        history.push((
            account_id.to_string(),
            BalancePoint {
                date: as_of,
                balance,
            },
        ));
        Ok(updated)
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(account_id.to_string())))
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| is_active_filter.map_or(true, |active| a.is_active == active))
            .cloned()
            .collect())
    }

    fn get_balance_history(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<BalancePoint>> {
        let mut points: Vec<BalancePoint> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, p)| {
                id == account_id
                    && start_date.map_or(true, |s| p.date >= s)
                    && end_date.map_or(true, |e| p.date <= e)
            })
            .map(|(_, p)| *p)
            .collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

// ---------------------------------------------------------------------------
// Projections and assumptions
// ---------------------------------------------------------------------------

/// Deletes and inserts with a yield in between so that unserialized
/// regenerations would interleave.
#[derive(Default)]
pub struct MockProjectionRepository {
    projections: Mutex<Vec<Projection>>,
}

impl MockProjectionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn all(&self) -> Vec<Projection> {
        self.projections.lock().unwrap().clone()
    }

    pub fn count_from(&self, account_id: &str, from: NaiveDate) -> usize {
        self.projections
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.account_id == account_id && p.projection_date >= from)
            .count()
    }

    pub fn seed(&self, projection: Projection) {
        self.projections.lock().unwrap().push(projection);
    }
}

pub fn stored_projection(
    account_id: &str,
    projection_date: NaiveDate,
    projected_balance: Decimal,
    actual_balance: Option<Decimal>,
) -> Projection {
    Projection {
        id: Uuid::new_v4().to_string(),
        account_id: account_id.to_string(),
        projection_date,
        projected_balance,
        currency: "CAD".to_string(),
        contribution: None,
        percentiles: None,
        actual_balance,
        is_adaptive: false,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

#[async_trait]
impl ProjectionRepositoryTrait for MockProjectionRepository {
    async fn replace_future_projections(
        &self,
        account_id: &str,
        from_date: NaiveDate,
        projections: Vec<NewProjection>,
    ) -> Result<usize> {
        self.projections
            .lock()
            .unwrap()
            .retain(|p| !(p.account_id == account_id && p.projection_date >= from_date));

        tokio::task::yield_now().await;

        let count = projections.len();
        for new in projections {
            {
                let mut stored = self.projections.lock().unwrap();
                stored.push(Projection {
                    id: Uuid::new_v4().to_string(),
                    account_id: new.account_id,
                    projection_date: new.projection_date,
                    projected_balance: new.projected_balance,
                    currency: new.currency,
                    contribution: new.contribution,
                    percentiles: new.percentiles,
                    actual_balance: None,
                    is_adaptive: new.is_adaptive,
                    created_at: timestamp(),
                    updated_at: timestamp(),
                });
            }
            tokio::task::yield_now().await;
        }
        Ok(count)
    }

    fn list_projections(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Projection>> {
        let mut found: Vec<Projection> = self
            .projections
            .lock()
            .unwrap()
            .iter()
            .filter(|p| {
                p.account_id == account_id
                    && start_date.map_or(true, |s| p.projection_date >= s)
                    && end_date.map_or(true, |e| p.projection_date <= e)
            })
            .cloned()
            .collect();
        found.sort_by_key(|p| p.projection_date);
        Ok(found)
    }

    fn list_with_actuals(
        &self,
        account_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Projection>> {
        Ok(self
            .list_projections(account_id, since, None)?
            .into_iter()
            .filter(|p| p.actual_balance.is_some())
            .collect())
    }

    async fn record_actual(
        &self,
        account_id: &str,
        projection_date: NaiveDate,
        actual_balance: Decimal,
    ) -> Result<bool> {
        let mut stored = self.projections.lock().unwrap();
        match stored.iter_mut().find(|p| {
            p.account_id == account_id
                && p.projection_date == projection_date
                && p.actual_balance.is_none()
        }) {
            Some(projection) => {
                projection.actual_balance = Some(actual_balance);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MockAssumptionRepository {
    assumptions: Mutex<Vec<ProjectionAssumption>>,
}

impl MockAssumptionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl AssumptionRepositoryTrait for MockAssumptionRepository {
    fn get_for_account(&self, account_id: &str) -> Result<Option<ProjectionAssumption>> {
        Ok(self
            .assumptions
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.account_id.as_deref() == Some(account_id))
            .cloned())
    }

    fn get_family_default(&self) -> Result<Option<ProjectionAssumption>> {
        Ok(self
            .assumptions
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.account_id.is_none())
            .cloned())
    }

    async fn save(&self, assumption: NewProjectionAssumption) -> Result<ProjectionAssumption> {
        let saved = ProjectionAssumption {
            id: assumption
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: assumption.account_id,
            name: assumption.name,
            expected_return: assumption.expected_return,
            monthly_contribution: assumption.monthly_contribution,
            volatility: assumption.volatility,
            use_pag_defaults: assumption.use_pag_defaults,
            created_at: timestamp(),
            updated_at: timestamp(),
        };
        let mut assumptions = self.assumptions.lock().unwrap();
        assumptions.retain(|a| a.account_id != saved.account_id);
        assumptions.push(saved.clone());
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Milestones
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockMilestoneRepository {
    milestones: Mutex<Vec<Milestone>>,
}

impl MockMilestoneRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl MilestoneRepositoryTrait for MockMilestoneRepository {
    async fn insert(&self, milestone: Milestone) -> Result<Milestone> {
        self.milestones.lock().unwrap().push(milestone.clone());
        Ok(milestone)
    }

    fn get_by_id(&self, milestone_id: &str) -> Result<Milestone> {
        self.milestones
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == milestone_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(milestone_id.to_string())))
    }

    fn list_for_account(&self, account_id: &str) -> Result<Vec<Milestone>> {
        let mut found: Vec<Milestone> = self
            .milestones
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.account_id == account_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.target_amount.cmp(&b.target_amount));
        Ok(found)
    }

    async fn update_many(&self, milestones: Vec<Milestone>) -> Result<usize> {
        let mut stored = self.milestones.lock().unwrap();
        let mut updated = 0;
        for milestone in milestones {
            if let Some(existing) = stored.iter_mut().find(|m| m.id == milestone.id) {
                *existing = milestone;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn delete(&self, milestone_id: &str) -> Result<usize> {
        let mut stored = self.milestones.lock().unwrap();
        let before = stored.len();
        stored.retain(|m| m.id != milestone_id);
        Ok(before - stored.len())
    }
}

// ---------------------------------------------------------------------------
// Debt optimization
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MockDebtOptimizationRepository {
    strategies: Mutex<Vec<DebtOptimizationStrategy>>,
    rules: Mutex<Vec<AutoStopRule>>,
    ledger: Mutex<Vec<LedgerEntry>>,
}

impl MockDebtOptimizationRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl DebtOptimizationRepositoryTrait for MockDebtOptimizationRepository {
    async fn insert_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy> {
        self.strategies.lock().unwrap().push(strategy.clone());
        Ok(strategy)
    }

    fn get_strategy(&self, strategy_id: &str) -> Result<DebtOptimizationStrategy> {
        self.strategies
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == strategy_id)
            .cloned()
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(strategy_id.to_string())))
    }

    fn list_strategies(&self) -> Result<Vec<DebtOptimizationStrategy>> {
        Ok(self.strategies.lock().unwrap().clone())
    }

    async fn update_strategy(
        &self,
        strategy: DebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy> {
        let mut strategies = self.strategies.lock().unwrap();
        let existing = strategies
            .iter_mut()
            .find(|s| s.id == strategy.id)
            .ok_or_else(|| Error::Database(DatabaseError::NotFound(strategy.id.clone())))?;
        *existing = strategy.clone();
        Ok(strategy)
    }

    async fn insert_rule(&self, rule: AutoStopRule) -> Result<AutoStopRule> {
        self.rules.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    fn list_rules(&self, strategy_id: &str) -> Result<Vec<AutoStopRule>> {
        let mut rules: Vec<AutoStopRule> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.strategy_id == strategy_id)
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.position);
        Ok(rules)
    }

    async fn replace_ledger(
        &self,
        strategy_id: &str,
        entries: Vec<LedgerEntry>,
    ) -> Result<usize> {
        let mut ledger = self.ledger.lock().unwrap();
        ledger.retain(|e| e.strategy_id != strategy_id);
        let count = entries.len();
        ledger.extend(entries);
        Ok(count)
    }

    fn list_ledger(&self, strategy_id: &str) -> Result<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .ledger
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.strategy_id == strategy_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.month_number);
        Ok(entries)
    }

    fn ledger_totals(&self, strategy_id: &str) -> Result<LedgerTotals> {
        Ok(LedgerTotals::from_entries(&self.list_ledger(strategy_id)?))
    }
}
