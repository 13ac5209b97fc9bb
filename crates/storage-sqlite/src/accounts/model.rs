//! Database models for accounts.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;
use serde::{Deserialize, Serialize};

use wealthcast_core::accounts::{Account, BalancePoint, LoanDetails, NewAccount};

use crate::utils::parse_decimal;

/// Database model for accounts
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub balance: String,
    pub is_active: bool,
    /// JSON-encoded [`LoanDetails`]
    pub loan_details: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One row of balance history
#[derive(Queryable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::account_balances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountBalanceDB {
    pub account_id: String,
    pub balance_date: NaiveDate,
    pub balance: String,
    pub recorded_at: NaiveDateTime,
}

impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        let loan = db.loan_details.as_deref().and_then(|json| {
            serde_json::from_str::<LoanDetails>(json)
                .map_err(|e| warn!("Ignoring unreadable loan details on account {}: {}", db.id, e))
                .ok()
        });
        Self {
            balance: parse_decimal(&db.balance, "balance"),
            id: db.id,
            name: db.name,
            account_type: db.account_type,
            currency: db.currency,
            is_active: db.is_active,
            loan,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl AccountDB {
    pub fn from_new(domain: NewAccount, id: String, now: NaiveDateTime) -> Self {
        Self {
            id,
            name: domain.name,
            account_type: domain.account_type,
            currency: domain.currency,
            balance: domain.balance.to_string(),
            is_active: domain.is_active,
            loan_details: domain
                .loan
                .and_then(|loan| serde_json::to_string(&loan).ok()),
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<AccountBalanceDB> for BalancePoint {
    fn from(db: AccountBalanceDB) -> Self {
        Self {
            date: db.balance_date,
            balance: parse_decimal(&db.balance, "balance"),
        }
    }
}
