use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fallbacks used when an account carries no loan terms of its own
pub const DEFAULT_MORTGAGE_RATE: Decimal = dec!(0.05);
pub const DEFAULT_HELOC_RATE: Decimal = dec!(0.07);
pub const DEFAULT_TERM_MONTHS: u32 = 300;
pub const DEFAULT_HELOC_LIMIT: Decimal = dec!(100000);
pub const DEFAULT_RENEWAL_TERM_MONTHS: u32 = 60;

/// Share of the original mortgage that a readvanceable HELOC may lend
pub const DEFAULT_READVANCE_RATIO: Decimal = dec!(0.80);

/// Yearly prepayment allowance as a share of original principal
pub const DEFAULT_PREPAYMENT_PRIVILEGE_PERCENT: Decimal = dec!(0.15);
pub const DEFAULT_PRIVILEGE_PERIOD_MONTHS: u32 = 12;

pub const DEFAULT_EFFECTIVE_TAX_RATE: Decimal = dec!(0.30);

/// Longest horizon a strategy may simulate
pub const MAX_SIMULATION_MONTHS: u32 = 1200;
