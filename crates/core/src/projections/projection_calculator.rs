//! Closed-form compound growth with level monthly contributions.
//!
//! The monthly rate is the geometric equivalent of the annual rate,
//! `r_m = (1 + r)^(1/12) - 1`, so twelve months of growth with no
//! contributions reproduce the annual rate exactly.
//!
//! Percentile bands assume lognormal dispersion around the deterministic
//! path: the median is the closed-form value and each percentile is
//! `median * exp(z * sigma * sqrt(n / 12))`.

use chrono::NaiveDate;
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use super::projections_constants::{BAND_DECIMAL_PRECISION, Z_P10, Z_P25, Z_P75, Z_P90};
use super::projections_model::{BandPoint, PercentileBands, ProjectionPoint};
use crate::constants::{DISPLAY_DECIMAL_PRECISION, MONTHS_PER_YEAR};
use crate::errors::{CalculatorError, Result};
use crate::utils::time_utils::month_end_after;

#[derive(Debug, Clone)]
pub struct ProjectionCalculator {
    principal: f64,
    monthly_rate: f64,
    monthly_contribution: f64,
    currency: String,
}

impl ProjectionCalculator {
    pub fn new(
        principal: Decimal,
        annual_rate: f64,
        monthly_contribution: Decimal,
        currency: impl Into<String>,
    ) -> Result<Self> {
        if !annual_rate.is_finite() || annual_rate <= -1.0 {
            return Err(CalculatorError::NonFiniteRate(annual_rate).into());
        }
        let monthly_rate = (1.0 + annual_rate).powf(1.0 / f64::from(MONTHS_PER_YEAR)) - 1.0;

        Ok(Self {
            principal: to_f64(principal)?,
            monthly_rate,
            monthly_contribution: to_f64(monthly_contribution)?,
            currency: currency.into(),
        })
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    /// Balance after `month` months, rounded to cents.
    pub fn future_value_at_month(&self, month: u32) -> Result<Decimal> {
        to_money(self.raw_future_value(month))
    }

    /// One end-of-month point per month for `months` months after `from`.
    pub fn project(&self, months: i64, from: NaiveDate) -> Result<Vec<ProjectionPoint>> {
        let months = checked_months(months)?;
        (1..=months)
            .map(|month| -> Result<ProjectionPoint> {
                Ok(ProjectionPoint {
                    date: month_end_after(from, month),
                    value: self.future_value_at_month(month)?,
                })
            })
            .collect()
    }

    /// Like [`project`](Self::project) with p10/p25/p50/p75/p90 bands.
    ///
    /// Bands are ordered ascending, so for a negative median (a growing debt)
    /// p10 is the most negative outcome. Values are not clamped at zero.
    /// Percentiles are kept at [`BAND_DECIMAL_PRECISION`] and the point value
    /// is p50 rounded to cents.
    pub fn project_with_analytical_bands(
        &self,
        months: i64,
        volatility: f64,
        from: NaiveDate,
    ) -> Result<Vec<BandPoint>> {
        if !volatility.is_finite() || volatility < 0.0 {
            return Err(CalculatorError::InvalidVolatility(volatility).into());
        }
        let months = checked_months(months)?;

        (1..=months)
            .map(|month| -> Result<BandPoint> {
                let median = self.raw_future_value(month);
                let spread = volatility * (f64::from(month) / f64::from(MONTHS_PER_YEAR)).sqrt();

                let mut values = [
                    median * (Z_P10 * spread).exp(),
                    median * (Z_P25 * spread).exp(),
                    median,
                    median * (Z_P75 * spread).exp(),
                    median * (Z_P90 * spread).exp(),
                ];
                values.sort_by(|a, b| a.total_cmp(b));

                let percentiles = PercentileBands {
                    p10: to_band(values[0])?,
                    p25: to_band(values[1])?,
                    p50: to_band(values[2])?,
                    p75: to_band(values[3])?,
                    p90: to_band(values[4])?,
                };
                Ok(BandPoint {
                    date: month_end_after(from, month),
                    value: percentiles.p50.round_dp(DISPLAY_DECIMAL_PRECISION),
                    percentiles,
                })
            })
            .collect()
    }

    fn raw_future_value(&self, month: u32) -> f64 {
        let n = f64::from(month);
        if self.monthly_rate == 0.0 {
            return self.principal + self.monthly_contribution * n;
        }
        let growth = (1.0 + self.monthly_rate).powf(n);
        self.principal * growth + self.monthly_contribution * ((growth - 1.0) / self.monthly_rate)
    }
}

fn checked_months(months: i64) -> Result<u32> {
    u32::try_from(months).map_err(|_| CalculatorError::NegativeMonths(months).into())
}

fn to_f64(value: Decimal) -> Result<f64> {
    value
        .to_f64()
        .ok_or_else(|| CalculatorError::Overflow(value.to_string()).into())
}

fn to_band(value: f64) -> Result<Decimal> {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(BAND_DECIMAL_PRECISION))
        .ok_or_else(|| CalculatorError::Overflow(value.to_string()).into())
}

// Goes through band precision first so a point value always equals its
// banded median rounded to cents.
fn to_money(value: f64) -> Result<Decimal> {
    Ok(to_band(value)?.round_dp(DISPLAY_DECIMAL_PRECISION))
}
