//! Realised-versus-projected error statistics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::projections_model::{AccuracyRating, ForecastAccuracy, Projection};
use crate::constants::DISPLAY_DECIMAL_PRECISION;

pub struct ForecastAccuracyCalculator;

impl ForecastAccuracyCalculator {
    /// Aggregates projections that carry an actual balance.
    ///
    /// Records without an actual, or with a projection of exactly zero, are
    /// skipped. Returns `None` when nothing is left: accuracy is unknown.
    pub fn calculate(projections: &[Projection]) -> Option<ForecastAccuracy> {
        let mut total_months = 0usize;
        let mut on_track_months = 0usize;
        let mut sum_variance = Decimal::ZERO;
        let mut sum_variance_pct = Decimal::ZERO;
        let mut sum_abs_pct = Decimal::ZERO;

        for projection in projections {
            let (Some(variance), Some(variance_pct)) =
                (projection.variance(), projection.variance_percentage())
            else {
                continue;
            };

            total_months += 1;
            sum_variance += variance;
            sum_variance_pct += variance_pct;
            sum_abs_pct += variance_pct.abs();
            if projection.is_on_track() == Some(true) {
                on_track_months += 1;
            }
        }

        if total_months == 0 {
            return None;
        }

        let count = Decimal::from(total_months);
        let mape = sum_abs_pct / count;

        Some(ForecastAccuracy {
            mean_absolute_percentage_error: mape.round_dp(DISPLAY_DECIMAL_PRECISION),
            mean_variance: (sum_variance / count).round_dp(DISPLAY_DECIMAL_PRECISION),
            mean_variance_percentage: (sum_variance_pct / count)
                .round_dp(DISPLAY_DECIMAL_PRECISION),
            on_track_months,
            total_months,
            rating: Self::rate(mape),
        })
    }

    fn rate(mape: Decimal) -> AccuracyRating {
        if mape <= dec!(5) {
            AccuracyRating::Excellent
        } else if mape <= dec!(10) {
            AccuracyRating::Good
        } else if mape <= dec!(20) {
            AccuracyRating::Fair
        } else {
            AccuracyRating::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn projection(projected: Decimal, actual: Option<Decimal>) -> Projection {
        Projection {
            id: "p".to_string(),
            account_id: "acc".to_string(),
            projection_date: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
            projected_balance: projected,
            currency: "CAD".to_string(),
            contribution: None,
            percentiles: None,
            actual_balance: actual,
            is_adaptive: false,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_variance_arithmetic() {
        let p = projection(dec!(13608.25), Some(dec!(13500)));
        assert_eq!(p.variance(), Some(dec!(-108.25)));
        assert_eq!(
            p.variance_percentage().map(|v| v.round_dp(2)),
            Some(dec!(-0.80))
        );
        assert_eq!(p.is_on_track(), Some(true));
    }

    #[test]
    fn test_more_than_ten_percent_below_is_off_track() {
        let p = projection(dec!(10000), Some(dec!(8900)));
        assert_eq!(p.is_on_track(), Some(false));

        let boundary = projection(dec!(10000), Some(dec!(9000)));
        assert_eq!(boundary.is_on_track(), Some(true));
    }

    #[test]
    fn test_zero_projection_has_no_percentage() {
        let p = projection(Decimal::ZERO, Some(dec!(50)));
        assert_eq!(p.variance(), Some(dec!(50)));
        assert_eq!(p.variance_percentage(), None);
        assert_eq!(p.is_on_track(), None);
    }

    #[test]
    fn test_negative_projection_uses_magnitude() {
        // Debt came in 1000 smaller than forecast: that is a positive variance
        let p = projection(dec!(-10000), Some(dec!(-9000)));
        assert_eq!(p.variance_percentage(), Some(dec!(10)));
    }

    #[test]
    fn test_empty_input_is_unknown() {
        assert_eq!(ForecastAccuracyCalculator::calculate(&[]), None);
        let without_actuals = vec![projection(dec!(100), None)];
        assert_eq!(ForecastAccuracyCalculator::calculate(&without_actuals), None);
    }

    #[test]
    fn test_aggregate_statistics() {
        let records = vec![
            projection(dec!(1000), Some(dec!(1020))), // +2%
            projection(dec!(1000), Some(dec!(940))),  // -6%
            projection(dec!(1000), Some(dec!(850))),  // -15%
            projection(dec!(1000), None),
        ];

        let stats = ForecastAccuracyCalculator::calculate(&records).unwrap();
        assert_eq!(stats.total_months, 3);
        assert_eq!(stats.on_track_months, 2);
        assert_eq!(stats.mean_variance, dec!(-63.33));
        assert_eq!(stats.mean_variance_percentage, dec!(-6.33));
        assert_eq!(stats.mean_absolute_percentage_error, dec!(7.67));
        assert_eq!(stats.rating, AccuracyRating::Good);
        assert_eq!(stats.on_track_ratio(), dec!(0.67));
    }
}
