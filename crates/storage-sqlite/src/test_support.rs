//! Temp-file databases for repository tests.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

use wealthcast_core::accounts::{Account, AccountRepositoryTrait, LoanDetails, NewAccount};

use crate::accounts::AccountRepository;
use crate::db::{create_pool, run_migrations, spawn_writer, DbPool, WriteHandle};

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    _dir: TempDir,
}

/// Migrated database in a fresh temp directory, with its writer actor.
pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();
    let pool = create_pool(&db_path).expect("pool");
    run_migrations(&pool).expect("migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub async fn seed_account(
    db: &TestDb,
    id: &str,
    account_type: &str,
    balance: Decimal,
    loan: Option<LoanDetails>,
) -> Account {
    AccountRepository::new(db.pool.clone(), db.writer.clone())
        .create(NewAccount {
            id: Some(id.to_string()),
            name: format!("Account {}", id),
            account_type: account_type.to_string(),
            currency: "CAD".to_string(),
            balance,
            is_active: true,
            loan,
        })
        .await
        .expect("seed account")
}
