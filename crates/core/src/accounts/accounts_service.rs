use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::accounts_model::{Account, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::Result;
use crate::milestones::MilestoneServiceTrait;
use crate::utils::Clock;

/// Service for managing accounts and keeping their milestones in sync.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
    milestone_service: Arc<dyn MilestoneServiceTrait>,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        milestone_service: Arc<dyn MilestoneServiceTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            milestone_service,
            clock,
        }
    }
}

#[async_trait::async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        self.repository.create(new_account).await
    }

    async fn update_balance(&self, account_id: &str, balance: Decimal) -> Result<Account> {
        let today = self.clock.today();
        debug!(
            "Updating balance for account {} to {} as of {}",
            account_id, balance, today
        );
        let account = self
            .repository
            .update_balance(account_id, balance, today)
            .await?;

        self.milestone_service
            .update_milestone_progress(account_id)
            .await?;
        self.milestone_service
            .update_milestone_projections(account_id)
            .await?;

        Ok(account)
    }

    fn get_account(&self, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(account_id)
    }

    fn get_active_accounts(&self) -> Result<Vec<Account>> {
        self.repository.list(Some(true))
    }
}
