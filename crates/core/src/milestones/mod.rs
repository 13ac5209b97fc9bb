//! Milestones module - balance targets, their progress and estimated dates.

mod milestones_model;
mod milestones_service;
mod milestones_traits;

#[cfg(test)]
mod milestones_service_tests;

pub use milestones_model::{Milestone, MilestoneStatus, NewMilestone};
pub use milestones_service::MilestoneService;
pub use milestones_traits::{MilestoneRepositoryTrait, MilestoneServiceTrait};
