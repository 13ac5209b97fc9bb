use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use wealthcast_core::projections::{NewProjection, Projection, ProjectionRepositoryTrait};
use wealthcast_core::Result;

use super::model::{NewProjectionDB, ProjectionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::projections;
use crate::utils::chunk_for_sqlite;

pub struct ProjectionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ProjectionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl ProjectionRepositoryTrait for ProjectionRepository {
    async fn replace_future_projections(
        &self,
        account_id: &str,
        from_date: NaiveDate,
        new_projections: Vec<NewProjection>,
    ) -> Result<usize> {
        let account_id = account_id.to_string();
        self.writer
            .exec(move |conn| -> Result<usize> {
                let deleted = diesel::delete(
                    projections::table
                        .filter(projections::account_id.eq(&account_id))
                        .filter(projections::projection_date.ge(from_date)),
                )
                .execute(conn)
                .map_err(StorageError::from)?;

                let now = Utc::now().naive_utc();
                let rows: Vec<NewProjectionDB> = new_projections
                    .into_iter()
                    .map(|p| NewProjectionDB::from_domain(p, Uuid::new_v4().to_string(), now))
                    .collect();
                let mut inserted = 0;
                for chunk in chunk_for_sqlite(&rows) {
                    inserted += diesel::insert_into(projections::table)
                        .values(chunk)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                debug!(
                    "Replaced {} projections with {} for account {} from {}",
                    deleted, inserted, account_id, from_date
                );
                Ok(inserted)
            })
            .await
    }

    fn list_projections(
        &self,
        account_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<Projection>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = projections::table
            .filter(projections::account_id.eq(account_id))
            .into_boxed();
        if let Some(start) = start_date {
            query = query.filter(projections::projection_date.ge(start));
        }
        if let Some(end) = end_date {
            query = query.filter(projections::projection_date.le(end));
        }
        let rows = query
            .select(ProjectionDB::as_select())
            .order(projections::projection_date.asc())
            .load::<ProjectionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Projection::from).collect())
    }

    fn list_with_actuals(
        &self,
        account_id: &str,
        since: Option<NaiveDate>,
    ) -> Result<Vec<Projection>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = projections::table
            .filter(projections::account_id.eq(account_id))
            .filter(projections::actual_balance.is_not_null())
            .into_boxed();
        if let Some(since) = since {
            query = query.filter(projections::projection_date.ge(since));
        }
        let rows = query
            .select(ProjectionDB::as_select())
            .order(projections::projection_date.asc())
            .load::<ProjectionDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Projection::from).collect())
    }

    async fn record_actual(
        &self,
        account_id: &str,
        projection_date: NaiveDate,
        actual_balance: Decimal,
    ) -> Result<bool> {
        let account_id = account_id.to_string();
        self.writer
            .exec(move |conn| -> Result<bool> {
                let updated = diesel::update(
                    projections::table
                        .filter(projections::account_id.eq(&account_id))
                        .filter(projections::projection_date.eq(projection_date))
                        .filter(projections::actual_balance.is_null()),
                )
                .set((
                    projections::actual_balance.eq(actual_balance.to_string()),
                    projections::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(updated == 1)
            })
            .await
    }
}
