use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::projections_model::{
    ForecastAccuracy, ForecastPeriod, NewProjection, NewProjectionAssumption, Projection,
    ProjectionAssumption, ProjectionChartData, ProjectionPoint,
};
use crate::errors::Result;

/// Trait for projection point persistence.
#[async_trait]
pub trait ProjectionRepositoryTrait: Send + Sync {
    /// Deletes the account's projections dated on or after `from_date` and
    /// inserts `projections`, as one all-or-nothing unit.
    ///
    /// Returns the number of inserted points.
    async fn replace_future_projections(
        &self,
        account_id: &str,
        from_date: NaiveDate,
        projections: Vec<NewProjection>,
    ) -> Result<usize>;

    /// Projections for an account in ascending date order, bounded inclusively.
    fn list_projections(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Projection>>;

    /// Projections that already carry an actual balance, dated on or after `since`.
    fn list_with_actuals(
        &self,
        account_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Projection>>;

    /// Stores the realised balance on the projection for `projection_date`.
    ///
    /// Returns false when there is no such projection or it already has an actual.
    async fn record_actual(
        &self,
        account_id: &str,
        projection_date: NaiveDate,
        actual_balance: Decimal,
    ) -> Result<bool>;
}

/// Trait for projection assumption persistence.
#[async_trait]
pub trait AssumptionRepositoryTrait: Send + Sync {
    fn get_for_account(&self, account_id: &str) -> Result<Option<ProjectionAssumption>>;

    fn get_family_default(&self) -> Result<Option<ProjectionAssumption>>;

    /// Inserts the assumption, replacing any existing one with the same scope
    /// (same account, or the family default when `account_id` is None).
    async fn save(&self, assumption: NewProjectionAssumption) -> Result<ProjectionAssumption>;
}

/// Trait for the projection service consumed by the application layer.
#[async_trait]
pub trait ProjectionServiceTrait: Send + Sync {
    /// Regenerates `months` future points for the account.
    async fn generate_for_account(
        &self,
        account_id: &str,
        months: i64,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<usize>;

    /// Regenerates with the account's effective assumption.
    async fn generate_projections(&self, account_id: &str, months: i64) -> Result<usize>;

    /// Forecast from the current balance, without persisting anything.
    fn adaptive_projection(
        &self,
        account_id: &str,
        years: u32,
        contribution: Option<Decimal>,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<Vec<ProjectionPoint>>;

    fn projection_chart_data(
        &self,
        account_id: &str,
        years: u32,
        assumption: Option<ProjectionAssumption>,
    ) -> Result<ProjectionChartData>;

    /// `None` when no projection in the window has an actual yet.
    fn forecast_accuracy(
        &self,
        account_id: &str,
        period: ForecastPeriod,
    ) -> Result<Option<ForecastAccuracy>>;

    fn get_effective_assumption(&self, account_id: &str) -> Result<ProjectionAssumption>;

    async fn save_assumption(
        &self,
        assumption: NewProjectionAssumption,
    ) -> Result<ProjectionAssumption>;

    fn list_future_projections(&self, account_id: &str) -> Result<Vec<Projection>>;

    async fn record_actual(
        &self,
        account_id: &str,
        projection_date: NaiveDate,
        actual_balance: Decimal,
    ) -> Result<bool>;

    /// Fills in actuals for past projections from the account's balance history.
    async fn reconcile_actuals(&self, account_id: &str) -> Result<usize>;
}
