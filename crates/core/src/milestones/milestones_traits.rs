use async_trait::async_trait;

use super::milestones_model::{Milestone, NewMilestone};
use crate::errors::Result;

/// Trait for milestone persistence.
#[async_trait]
pub trait MilestoneRepositoryTrait: Send + Sync {
    async fn insert(&self, milestone: Milestone) -> Result<Milestone>;

    fn get_by_id(&self, milestone_id: &str) -> Result<Milestone>;

    /// Milestones for an account ordered by target amount.
    fn list_for_account(&self, account_id: &str) -> Result<Vec<Milestone>>;

    /// Overwrites status, projected date and achievement time of each milestone.
    async fn update_many(&self, milestones: Vec<Milestone>) -> Result<usize>;

    async fn delete(&self, milestone_id: &str) -> Result<usize>;
}

/// Trait for milestone operations.
#[async_trait]
pub trait MilestoneServiceTrait: Send + Sync {
    async fn create_milestone(&self, new_milestone: NewMilestone) -> Result<Milestone>;

    fn list_milestones(&self, account_id: &str) -> Result<Vec<Milestone>>;

    async fn delete_milestone(&self, milestone_id: &str) -> Result<usize>;

    /// Nearest open milestone in the account's favourable direction.
    fn next_milestone(&self, account_id: &str) -> Result<Option<Milestone>>;

    /// Recomputes every milestone's status from the current balance.
    async fn update_milestone_progress(&self, account_id: &str) -> Result<Vec<Milestone>>;

    /// Re-estimates achievement dates for open milestones from scratch.
    async fn update_milestone_projections(&self, account_id: &str) -> Result<Vec<Milestone>>;
}
