//! Wealthcast Core - balance projections, milestones and debt simulation.
//!
//! This crate contains the domain models, calculators and services. It is
//! database-agnostic and defines repository traits that are implemented
//! by the `storage-sqlite` crate.

pub mod accounts;
pub mod constants;
pub mod debt_optimization;
pub mod errors;
pub mod loans;
pub mod milestones;
pub mod projections;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
