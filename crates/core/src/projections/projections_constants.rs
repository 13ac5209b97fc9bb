use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default forecast horizon when callers do not specify one
pub const DEFAULT_PROJECTION_MONTHS: i64 = 120;

/// Id reported for the built-in conservative assumption
pub const PAG_ASSUMPTION_ID: &str = "pag-default";

/// Conservative planning defaults (balanced portfolio, net of fees)
pub const PAG_EXPECTED_RETURN: Decimal = dec!(0.053);
pub const PAG_VOLATILITY: Decimal = dec!(0.10);
pub const PAG_MONTHLY_CONTRIBUTION: Decimal = dec!(0);

/// Percentiles keep sub-cent precision so small balances stay strictly ordered
pub const BAND_DECIMAL_PRECISION: u32 = 6;

/// Standard-normal quantiles for the reported percentiles
pub const Z_P10: f64 = -1.281_551_565_545;
pub const Z_P25: f64 = -0.674_489_750_196;
pub const Z_P75: f64 = 0.674_489_750_196;
pub const Z_P90: f64 = 1.281_551_565_545;

/// A month is on track when realised balance is at most 10% below forecast
pub const ON_TRACK_VARIANCE_PERCENT: Decimal = dec!(-10);
