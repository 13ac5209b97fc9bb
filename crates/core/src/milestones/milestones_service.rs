use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use super::milestones_model::{Milestone, MilestoneStatus, NewMilestone};
use super::milestones_traits::{MilestoneRepositoryTrait, MilestoneServiceTrait};
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::errors::{DatabaseError, Error, Result};
use crate::loans::LoanPayoffCalculator;
use crate::projections::{Projection, ProjectionRepositoryTrait};
use crate::utils::Clock;

/// Keeps milestone status and ETAs in step with balances and projections.
pub struct MilestoneService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    milestone_repository: Arc<dyn MilestoneRepositoryTrait>,
    projection_repository: Arc<dyn ProjectionRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl MilestoneService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        milestone_repository: Arc<dyn MilestoneRepositoryTrait>,
        projection_repository: Arc<dyn ProjectionRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repository,
            milestone_repository,
            projection_repository,
            clock,
        }
    }

    /// Amortization schedule for reduction milestones on loan accounts.
    fn payoff_calculator(account: &Account) -> Result<Option<LoanPayoffCalculator>> {
        if !account.is_loan_backed() {
            return Ok(None);
        }
        let Some(loan) = account.loan.as_ref() else {
            return Ok(None);
        };
        match (loan.annual_rate, loan.term_months) {
            (Some(rate), Some(term)) => Ok(Some(LoanPayoffCalculator::new(
                account.outstanding_balance(),
                rate,
                term,
            )?)),
            _ => Ok(None),
        }
    }

    /// First future projection at which the milestone would be reached.
    fn first_projected_date(
        milestone: &Milestone,
        account: &Account,
        projections: &[Projection],
    ) -> Option<NaiveDate> {
        projections
            .iter()
            .find(|p| {
                let balance = if account.is_liability() {
                    p.projected_balance.abs()
                } else {
                    p.projected_balance
                };
                milestone.is_reached_by(balance)
            })
            .map(|p| p.projection_date)
    }
}

#[async_trait]
impl MilestoneServiceTrait for MilestoneService {
    async fn create_milestone(&self, new_milestone: NewMilestone) -> Result<Milestone> {
        new_milestone.validate()?;
        let account = self.account_repository.get_by_id(&new_milestone.account_id)?;

        let now = Utc::now().naive_utc();
        let mut milestone = Milestone {
            id: new_milestone
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            account_id: account.id.clone(),
            name: new_milestone.name,
            target_amount: new_milestone.target_amount,
            starting_balance: account.comparable_balance(),
            status: MilestoneStatus::Pending,
            is_reduction: account.is_liability(),
            projected_date: None,
            achieved_at: None,
            created_at: now,
            updated_at: now,
        };
        milestone.status = milestone.status_for(milestone.starting_balance);
        if milestone.status == MilestoneStatus::Achieved {
            milestone.achieved_at = self.clock.today().and_hms_opt(0, 0, 0);
        }

        let created = self.milestone_repository.insert(milestone).await?;
        let refreshed = self.update_milestone_projections(&account.id).await?;
        Ok(refreshed
            .into_iter()
            .find(|m| m.id == created.id)
            .unwrap_or(created))
    }

    fn list_milestones(&self, account_id: &str) -> Result<Vec<Milestone>> {
        self.milestone_repository.list_for_account(account_id)
    }

    async fn delete_milestone(&self, milestone_id: &str) -> Result<usize> {
        let deleted = self.milestone_repository.delete(milestone_id).await?;
        if deleted == 0 {
            return Err(Error::Database(DatabaseError::NotFound(format!(
                "Milestone {}",
                milestone_id
            ))));
        }
        Ok(deleted)
    }

    fn next_milestone(&self, account_id: &str) -> Result<Option<Milestone>> {
        let account = self.account_repository.get_by_id(account_id)?;
        let balance = account.comparable_balance();
        let open = self
            .milestone_repository
            .list_for_account(account_id)?
            .into_iter()
            .filter(Milestone::is_open);

        // Debts shrink toward the highest target below the balance; assets
        // grow toward the lowest target above it
        let next = if account.is_liability() {
            open.filter(|m| m.target_amount < balance)
                .max_by(|a, b| a.target_amount.cmp(&b.target_amount))
        } else {
            open.filter(|m| m.target_amount > balance)
                .min_by(|a, b| a.target_amount.cmp(&b.target_amount))
        };
        Ok(next)
    }

    async fn update_milestone_progress(&self, account_id: &str) -> Result<Vec<Milestone>> {
        let account = self.account_repository.get_by_id(account_id)?;
        let balance = account.comparable_balance();
        let today = self.clock.today();
        let now = Utc::now().naive_utc();

        let mut milestones = self.milestone_repository.list_for_account(account_id)?;
        let mut changed = Vec::new();
        for milestone in milestones.iter_mut() {
            let status = milestone.status_for(balance);
            if status == milestone.status {
                continue;
            }
            if status == MilestoneStatus::Achieved {
                milestone.achieved_at = today.and_hms_opt(0, 0, 0);
            }
            milestone.status = status;
            milestone.updated_at = now;
            changed.push(milestone.clone());
        }

        if !changed.is_empty() {
            debug!(
                "Milestone status changed for {} milestone(s) on account {}",
                changed.len(),
                account_id
            );
            self.milestone_repository.update_many(changed).await?;
        }
        Ok(milestones)
    }

    async fn update_milestone_projections(&self, account_id: &str) -> Result<Vec<Milestone>> {
        let account = self.account_repository.get_by_id(account_id)?;
        let mut milestones = self.milestone_repository.list_for_account(account_id)?;
        if !milestones.iter().any(Milestone::is_open) {
            return Ok(milestones);
        }

        let today = self.clock.today();
        let payoff = Self::payoff_calculator(&account)?;
        let projections = self
            .projection_repository
            .list_projections(account_id, Some(today), None)?;
        let now = Utc::now().naive_utc();

        let mut open = Vec::new();
        for milestone in milestones.iter_mut().filter(|m| m.is_open()) {
            milestone.projected_date = match (&payoff, milestone.is_reduction) {
                (Some(calculator), true) => {
                    calculator.date_when_balance_at_or_below(milestone.target_amount, today)
                }
                _ => Self::first_projected_date(milestone, &account, &projections),
            };
            milestone.updated_at = now;
            open.push(milestone.clone());
        }

        let updated = self.milestone_repository.update_many(open).await?;
        debug!(
            "Re-estimated {} milestone date(s) for account {}",
            updated, account_id
        );
        Ok(milestones)
    }
}

