//! SQLite storage implementation for Wealthcast.
//!
//! This crate is the only place where Diesel dependencies exist. It provides:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the traits defined in `wealthcast-core`
//! - Database-specific model types (with Diesel derives)
//!
//! All writes go through a single writer actor ([`WriteHandle`]) that runs
//! each job in its own immediate transaction, so multi-statement writes such
//! as replacing an account's future projections are applied all-or-nothing
//! and never interleave.

pub mod db;
pub mod errors;
pub mod schema;
mod utils;

// Repository implementations
pub mod accounts;
pub mod debt_optimization;
pub mod milestones;
pub mod projections;

#[cfg(test)]
pub(crate) mod test_support;

pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

pub use errors::{IntoCore, StorageError};

pub use accounts::AccountRepository;
pub use debt_optimization::DebtOptimizationRepository;
pub use milestones::MilestoneRepository;
pub use projections::{AssumptionRepository, ProjectionRepository};

pub use wealthcast_core::errors::{DatabaseError, Error, Result};
