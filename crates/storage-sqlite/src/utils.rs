//! Helpers for the TEXT encoding of decimal columns.
//!
//! Money and rates are stored as decimal strings so they survive a round
//! trip exactly. Reads are tolerant of values written by other tools in
//! scientific or float notation.

use log::error;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a stored decimal, falling back to a float parse and finally to zero.
pub fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    if let Ok(parsed) = Decimal::from_str(value) {
        return parsed;
    }
    match f64::from_str(value).ok().and_then(Decimal::from_f64) {
        Some(parsed) => parsed,
        None => {
            error!(
                "Failed to parse {} '{}' as a decimal. Falling back to zero.",
                field_name, value
            );
            Decimal::ZERO
        }
    }
}

pub fn parse_optional_decimal(value: Option<&str>, field_name: &str) -> Option<Decimal> {
    value.map(|v| parse_decimal(v, field_name))
}

/// Rows per multi-row INSERT, well under SQLite's bound-parameter limit
/// for the widest table.
pub const SQLITE_INSERT_CHUNK: usize = 500;

/// Splits a batch into chunks of [`SQLITE_INSERT_CHUNK`] rows.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_INSERT_CHUNK)
}

pub fn optional_decimal_to_string(value: Option<Decimal>) -> Option<String> {
    value.map(|v| v.to_string())
}
