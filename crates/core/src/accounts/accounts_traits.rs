//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types, allowing for different storage implementations.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::accounts_model::{Account, BalancePoint, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates a new account and records its opening balance.
    async fn create(&self, new_account: NewAccount) -> Result<Account>;

    /// Sets the current balance and upserts the balance history point for `as_of`.
    async fn update_balance(
        &self,
        account_id: &str,
        balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<Account>;

    /// Retrieves an account by its ID.
    fn get_by_id(&self, account_id: &str) -> Result<Account>;

    /// Lists accounts, optionally filtered by active status.
    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Account>>;

    /// Balance history in ascending date order, bounded inclusively.
    fn get_balance_history(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<BalancePoint>>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Records a new balance and resynchronises the account's milestones.
    async fn update_balance(&self, account_id: &str, balance: Decimal) -> Result<Account>;

    fn get_account(&self, account_id: &str) -> Result<Account>;

    fn get_active_accounts(&self) -> Result<Vec<Account>>;
}
