//! SQLite storage implementation for projections and their assumptions.

mod assumption_repository;
mod model;
mod repository;


pub use assumption_repository::AssumptionRepository;
pub use model::{NewProjectionDB, ProjectionAssumptionDB, ProjectionDB};
pub use repository::ProjectionRepository;
