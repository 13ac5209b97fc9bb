use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use wealthcast_core::accounts::{Account, AccountRepositoryTrait, BalancePoint, NewAccount};
use wealthcast_core::Result;

use super::model::{AccountBalanceDB, AccountDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{account_balances, accounts};

/// Repository for managing account data in the database
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn upsert_balance(
    conn: &mut SqliteConnection,
    account_id: &str,
    balance: Decimal,
    as_of: NaiveDate,
) -> Result<()> {
    let row = AccountBalanceDB {
        account_id: account_id.to_string(),
        balance_date: as_of,
        balance: balance.to_string(),
        recorded_at: Utc::now().naive_utc(),
    };
    diesel::insert_into(account_balances::table)
        .values(&row)
        .on_conflict((account_balances::account_id, account_balances::balance_date))
        .do_update()
        .set((
            account_balances::balance.eq(&row.balance),
            account_balances::recorded_at.eq(row.recorded_at),
        ))
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(())
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;

        self.writer
            .exec(move |conn| -> Result<Account> {
                let now = Utc::now().naive_utc();
                let id = new_account
                    .id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let opening_balance = new_account.balance;
                let account_db = AccountDB::from_new(new_account, id, now);

                diesel::insert_into(accounts::table)
                    .values(&account_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                upsert_balance(conn, &account_db.id, opening_balance, now.date())?;

                Ok(account_db.into())
            })
            .await
    }

    async fn update_balance(
        &self,
        account_id: &str,
        balance: Decimal,
        as_of: NaiveDate,
    ) -> Result<Account> {
        let account_id = account_id.to_string();
        self.writer
            .exec(move |conn| -> Result<Account> {
                diesel::update(accounts::table.find(&account_id))
                    .set((
                        accounts::balance.eq(balance.to_string()),
                        accounts::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let updated = accounts::table
                    .find(&account_id)
                    .select(AccountDB::as_select())
                    .first::<AccountDB>(conn)
                    .map_err(StorageError::from)?;
                upsert_balance(conn, &account_id, balance, as_of)?;
                Ok(updated.into())
            })
            .await
    }

    fn get_by_id(&self, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        let account = accounts::table
            .find(account_id)
            .select(AccountDB::as_select())
            .first::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(account.into())
    }

    fn list(&self, is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = accounts::table.into_boxed();
        if let Some(active) = is_active_filter {
            query = query.filter(accounts::is_active.eq(active));
        }
        let rows = query
            .select(AccountDB::as_select())
            .order((accounts::is_active.desc(), accounts::name.asc()))
            .load::<AccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    fn get_balance_history(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<BalancePoint>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = account_balances::table
            .filter(account_balances::account_id.eq(account_id))
            .into_boxed();
        if let Some(start) = start_date {
            query = query.filter(account_balances::balance_date.ge(start));
        }
        if let Some(end) = end_date {
            query = query.filter(account_balances::balance_date.le(end));
        }
        let rows = query
            .select(AccountBalanceDB::as_select())
            .order(account_balances::balance_date.asc())
            .load::<AccountBalanceDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(BalancePoint::from).collect())
    }
}
