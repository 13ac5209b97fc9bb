//! SQLite storage implementation for milestones.

mod model;
mod repository;


pub use model::MilestoneDB;
pub use repository::MilestoneRepository;
