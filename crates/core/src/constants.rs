/// Decimal precision for persisted and displayed money amounts
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Number of months in a year
pub const MONTHS_PER_YEAR: u32 = 12;
