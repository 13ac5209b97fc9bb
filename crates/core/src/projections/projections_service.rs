use async_trait::async_trait;
use chrono::{Months, NaiveDate};
use log::{debug, info};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::account_lock::AccountLocks;
use super::forecast_accuracy::ForecastAccuracyCalculator;
use super::projection_calculator::ProjectionCalculator;
use super::projections_model::{
    ForecastAccuracy, ForecastPeriod, NewProjection, NewProjectionAssumption, Projection,
    ProjectionAssumption, ProjectionChartData, ProjectionPoint,
};
use super::projections_traits::{
    AssumptionRepositoryTrait, ProjectionRepositoryTrait, ProjectionServiceTrait,
};
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::constants::MONTHS_PER_YEAR;
use crate::errors::{CalculatorError, Error, Result};
use crate::milestones::MilestoneServiceTrait;
use crate::utils::time_utils::first_of_month;
use crate::utils::Clock;

pub struct ProjectionService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    projection_repository: Arc<dyn ProjectionRepositoryTrait>,
    assumption_repository: Arc<dyn AssumptionRepositoryTrait>,
    milestone_service: Option<Arc<dyn MilestoneServiceTrait>>,
    clock: Arc<dyn Clock>,
    locks: AccountLocks,
}

impl ProjectionService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        projection_repository: Arc<dyn ProjectionRepositoryTrait>,
        assumption_repository: Arc<dyn AssumptionRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repository,
            projection_repository,
            assumption_repository,
            milestone_service: None,
            clock,
            locks: AccountLocks::new(),
        }
    }

    /// Recompute milestone ETAs after every regeneration.
    pub fn with_milestone_service(
        mut self,
        milestone_service: Arc<dyn MilestoneServiceTrait>,
    ) -> Self {
        self.milestone_service = Some(milestone_service);
        self
    }

    /// Explicit argument, else the account's own, else the family default,
    /// else the built-in planning defaults.
    fn resolve_assumption(
        &self,
        account_id: &str,
        explicit: Option<ProjectionAssumption>,
    ) -> Result<ProjectionAssumption> {
        if let Some(assumption) = explicit {
            return Ok(assumption);
        }
        if let Some(assumption) = self.assumption_repository.get_for_account(account_id)? {
            return Ok(assumption);
        }
        Ok(self
            .assumption_repository
            .get_family_default()?
            .unwrap_or_else(ProjectionAssumption::pag_defaults))
    }

    fn calculator_for(
        account: &Account,
        assumption: &ProjectionAssumption,
        contribution: Decimal,
    ) -> Result<ProjectionCalculator> {
        ProjectionCalculator::new(
            account.balance,
            decimal_to_f64(assumption.effective_return())?,
            contribution,
            account.currency.clone(),
        )
    }

    fn build_projection_batch(
        &self,
        account: &Account,
        assumption: &ProjectionAssumption,
        months: i64,
        today: NaiveDate,
    ) -> Result<Vec<NewProjection>> {
        let contribution = assumption.effective_contribution();
        let calculator = Self::calculator_for(account, assumption, contribution)?;
        let volatility = decimal_to_f64(assumption.effective_volatility())?;

        let batch: Vec<NewProjection> = if volatility > 0.0 {
            calculator
                .project_with_analytical_bands(months, volatility, today)?
                .into_iter()
                .map(|point| NewProjection {
                    account_id: account.id.clone(),
                    projection_date: point.date,
                    projected_balance: point.value,
                    currency: account.currency.clone(),
                    contribution: Some(contribution),
                    percentiles: Some(point.percentiles),
                    is_adaptive: false,
                })
                .collect()
        } else {
            calculator
                .project(months, today)?
                .into_iter()
                .map(|point| NewProjection {
                    account_id: account.id.clone(),
                    projection_date: point.date,
                    projected_balance: point.value,
                    currency: account.currency.clone(),
                    contribution: Some(contribution),
                    percentiles: None,
                    is_adaptive: false,
                })
                .collect()
        };

        for projection in &batch {
            projection.validate()?;
        }
        Ok(batch)
    }
}

#[async_trait]
impl ProjectionServiceTrait for ProjectionService {
    async fn generate_for_account(
        &self,
        account_id: &str,
        months: i64,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<usize> {
        let account = self.account_repository.get_by_id(account_id)?;
        let assumption = self.resolve_assumption(account_id, assumption)?;
        let today = self.clock.today();

        // Build and validate everything before touching stored points
        let batch = self.build_projection_batch(&account, &assumption, months, today)?;

        let inserted = {
            let _guard = self.locks.lock(account_id).await;
            debug!(
                "Regenerating {} projections for account {} from {} (assumption {})",
                batch.len(),
                account_id,
                today,
                assumption.id
            );
            self.projection_repository
                .replace_future_projections(account_id, today, batch)
                .await?
        };

        if let Some(milestone_service) = &self.milestone_service {
            milestone_service
                .update_milestone_projections(account_id)
                .await?;
        }

        Ok(inserted)
    }

    async fn generate_projections(&self, account_id: &str, months: i64) -> Result<usize> {
        self.generate_for_account(account_id, months, None).await
    }

    fn adaptive_projection(
        &self,
        account_id: &str,
        years: u32,
        contribution: Option<Decimal>,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<Vec<ProjectionPoint>> {
        let account = self.account_repository.get_by_id(account_id)?;
        let assumption = self.resolve_assumption(account_id, assumption)?;
        let contribution = contribution.unwrap_or_else(|| assumption.effective_contribution());

        let calculator = Self::calculator_for(&account, &assumption, contribution)?;
        calculator.project(i64::from(horizon_months(years)?), self.clock.today())
    }

    fn projection_chart_data(
        &self,
        account_id: &str,
        years: u32,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<ProjectionChartData> {
        let account = self.account_repository.get_by_id(account_id)?;
        let assumption = self.resolve_assumption(account_id, assumption)?;
        let today = self.clock.today();
        let months = horizon_months(years)?;

        let history_start = today.checked_sub_months(Months::new(months));
        let historical = self
            .account_repository
            .get_balance_history(account_id, history_start, Some(today))?
            .into_iter()
            .map(|point| ProjectionPoint {
                date: point.date,
                value: point.balance,
            })
            .collect();

        let calculator =
            Self::calculator_for(&account, &assumption, assumption.effective_contribution())?;
        let projections = calculator.project_with_analytical_bands(
            i64::from(months),
            decimal_to_f64(assumption.effective_volatility())?,
            today,
        )?;

        Ok(ProjectionChartData {
            historical,
            projections,
            currency: account.currency,
            today,
        })
    }

    fn forecast_accuracy(
        &self,
        account_id: &str,
        period: ForecastPeriod,
    ) -> Result<Option<ForecastAccuracy>> {
        let today = self.clock.today();
        let projections: Vec<Projection> = self
            .projection_repository
            .list_with_actuals(account_id, period.start_date(today))?
            .into_iter()
            .filter(|p| p.projection_date <= today)
            .collect();

        Ok(ForecastAccuracyCalculator::calculate(&projections))
    }

    fn get_effective_assumption(&self, account_id: &str) -> Result<ProjectionAssumption> {
        self.resolve_assumption(account_id, None)
    }

    async fn save_assumption(
        &self,
        assumption: NewProjectionAssumption,
    ) -> Result<ProjectionAssumption> {
        assumption.validate()?;
        self.assumption_repository.save(assumption).await
    }

    fn list_future_projections(&self, account_id: &str) -> Result<Vec<Projection>> {
        self.projection_repository
            .list_projections(account_id, Some(self.clock.today()), None)
    }

    async fn record_actual(
        &self,
        account_id: &str,
        projection_date: NaiveDate,
        actual_balance: Decimal,
    ) -> Result<bool> {
        self.projection_repository
            .record_actual(account_id, projection_date, actual_balance)
            .await
    }

    async fn reconcile_actuals(&self, account_id: &str) -> Result<usize> {
        let today = self.clock.today();
        let pending: Vec<Projection> = self
            .projection_repository
            .list_projections(account_id, None, Some(today))?
            .into_iter()
            .filter(|p| p.actual_balance.is_none())
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }

        let history = self
            .account_repository
            .get_balance_history(account_id, None, Some(today))?;

        let mut recorded = 0;
        for projection in pending {
            // Latest balance recorded in the projection's own month, up to its date
            let month_start = first_of_month(projection.projection_date);
            let Some(point) = history
                .iter()
                .rev()
                .find(|h| h.date <= projection.projection_date && h.date >= month_start)
            else {
                continue;
            };

            if self
                .projection_repository
                .record_actual(account_id, projection.projection_date, point.balance)
                .await?
            {
                recorded += 1;
            }
        }

        if recorded > 0 {
            info!(
                "Recorded {} actual balances for account {}",
                recorded, account_id
            );
        }
        Ok(recorded)
    }
}

fn decimal_to_f64(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| CalculatorError::Overflow(value.to_string()).into())
}


fn horizon_months(years: u32) -> Result<u32> {
    years.checked_mul(MONTHS_PER_YEAR).ok_or_else(|| {
        Error::invalid_input(format!(
            "Projection horizon of {} years is too long",
            years
        ))
    })
}
