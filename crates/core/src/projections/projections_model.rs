//! Projection domain models.

use chrono::{Months, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::projections_constants::{
    ON_TRACK_VARIANCE_PERCENT, PAG_ASSUMPTION_ID, PAG_EXPECTED_RETURN, PAG_MONTHLY_CONTRIBUTION,
    PAG_VOLATILITY,
};
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};

/// Return, contribution and volatility parameters driving a projection.
///
/// An assumption with no `account_id` is the family-wide default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionAssumption {
    pub id: String,
    pub account_id: Option<String>,
    pub name: String,
    pub expected_return: Option<Decimal>,
    pub monthly_contribution: Option<Decimal>,
    pub volatility: Option<Decimal>,
    /// Ignore the custom values and use the conservative planning defaults
    pub use_pag_defaults: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProjectionAssumption {
    /// Built-in assumption used when neither the account nor the family has one.
    pub fn pag_defaults() -> Self {
        Self {
            id: PAG_ASSUMPTION_ID.to_string(),
            account_id: None,
            name: "Planning guideline defaults".to_string(),
            expected_return: None,
            monthly_contribution: None,
            volatility: None,
            use_pag_defaults: true,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    pub fn effective_return(&self) -> Decimal {
        match (self.use_pag_defaults, self.expected_return) {
            (false, Some(rate)) => rate,
            _ => PAG_EXPECTED_RETURN,
        }
    }

    pub fn effective_volatility(&self) -> Decimal {
        match (self.use_pag_defaults, self.volatility) {
            (false, Some(volatility)) => volatility,
            _ => PAG_VOLATILITY,
        }
    }

    /// Contributions are the user's own plan, so they are kept under PAG defaults.
    pub fn effective_contribution(&self) -> Decimal {
        self.monthly_contribution
            .unwrap_or(PAG_MONTHLY_CONTRIBUTION)
    }
}

/// Input model for creating or replacing an assumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectionAssumption {
    pub id: Option<String>,
    pub account_id: Option<String>,
    pub name: String,
    pub expected_return: Option<Decimal>,
    pub monthly_contribution: Option<Decimal>,
    pub volatility: Option<Decimal>,
    pub use_pag_defaults: bool,
}

impl NewProjectionAssumption {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self
            .expected_return
            .is_some_and(|rate| rate <= Decimal::NEGATIVE_ONE)
        {
            return Err(Error::invalid_input(
                "Expected return must be greater than -100%",
            ));
        }
        if self.volatility.is_some_and(|v| v.is_sign_negative()) {
            return Err(Error::invalid_input("Volatility cannot be negative"));
        }
        Ok(())
    }
}

/// p10..p90 balances around the median forecast.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PercentileBands {
    pub p10: Decimal,
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    pub p90: Decimal,
}

impl PercentileBands {
    pub fn as_array(&self) -> [Decimal; 5] {
        [self.p10, self.p25, self.p50, self.p75, self.p90]
    }
}

/// A persisted forecast point, unique per (account, date).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub id: String,
    pub account_id: String,
    pub projection_date: NaiveDate,
    pub projected_balance: Decimal,
    pub currency: String,
    pub contribution: Option<Decimal>,
    pub percentiles: Option<PercentileBands>,
    pub actual_balance: Option<Decimal>,
    /// Recomputed from the current balance rather than originally generated
    pub is_adaptive: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Projection {
    /// `actual - projected`, once an actual has been recorded.
    pub fn variance(&self) -> Option<Decimal> {
        self.actual_balance
            .map(|actual| actual - self.projected_balance)
    }

    /// Variance relative to the magnitude of the projection, in percent.
    ///
    /// Undefined when the projection is exactly zero.
    pub fn variance_percentage(&self) -> Option<Decimal> {
        if self.projected_balance.is_zero() {
            return None;
        }
        self.variance()
            .map(|variance| variance / self.projected_balance.abs() * Decimal::ONE_HUNDRED)
    }

    pub fn is_on_track(&self) -> Option<bool> {
        self.variance_percentage()
            .map(|pct| pct >= ON_TRACK_VARIANCE_PERCENT)
    }
}

/// Input model for inserting a projection point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewProjection {
    pub account_id: String,
    pub projection_date: NaiveDate,
    pub projected_balance: Decimal,
    pub currency: String,
    pub contribution: Option<Decimal>,
    pub percentiles: Option<PercentileBands>,
    pub is_adaptive: bool,
}

impl NewProjection {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "account_id".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "currency".to_string(),
            )));
        }
        Ok(())
    }
}

/// A dated value on a forecast or history line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// A forecast point with its percentile band.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BandPoint {
    pub date: NaiveDate,
    pub value: Decimal,
    pub percentiles: PercentileBands,
}

/// Everything a chart needs to draw history next to the forecast fan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionChartData {
    pub historical: Vec<ProjectionPoint>,
    pub projections: Vec<BandPoint>,
    pub currency: String,
    pub today: NaiveDate,
}

/// Recency window for forecast accuracy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForecastPeriod {
    #[default]
    AllTime,
    Last12Months,
    Last6Months,
}

impl ForecastPeriod {
    /// Earliest projection date included in the window, if bounded.
    pub fn start_date(&self, today: NaiveDate) -> Option<NaiveDate> {
        let months = match self {
            ForecastPeriod::AllTime => return None,
            ForecastPeriod::Last12Months => 12,
            ForecastPeriod::Last6Months => 6,
        };
        today.checked_sub_months(Months::new(months))
    }
}

/// Overall quality of past forecasts, by mean absolute percentage error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// Aggregate error statistics over projections with recorded actuals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastAccuracy {
    pub mean_absolute_percentage_error: Decimal,
    pub mean_variance: Decimal,
    pub mean_variance_percentage: Decimal,
    pub on_track_months: usize,
    pub total_months: usize,
    pub rating: AccuracyRating,
}

impl ForecastAccuracy {
    pub fn on_track_ratio(&self) -> Decimal {
        if self.total_months == 0 {
            return Decimal::ZERO;
        }
        (Decimal::from(self.on_track_months) / Decimal::from(self.total_months))
            .round_dp(DISPLAY_DECIMAL_PRECISION)
    }
}
