use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;
use uuid::Uuid;

use wealthcast_core::projections::{
    AssumptionRepositoryTrait, NewProjectionAssumption, ProjectionAssumption,
};
use wealthcast_core::Result;

use super::model::ProjectionAssumptionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::projection_assumptions;

pub struct AssumptionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AssumptionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl AssumptionRepositoryTrait for AssumptionRepository {
    fn get_for_account(&self, account_id: &str) -> Result<Option<ProjectionAssumption>> {
        let mut conn = get_connection(&self.pool)?;
        let row = projection_assumptions::table
            .filter(projection_assumptions::account_id.eq(account_id))
            .select(ProjectionAssumptionDB::as_select())
            .first::<ProjectionAssumptionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(ProjectionAssumption::from))
    }

    fn get_family_default(&self) -> Result<Option<ProjectionAssumption>> {
        let mut conn = get_connection(&self.pool)?;
        let row = projection_assumptions::table
            .filter(projection_assumptions::account_id.is_null())
            .select(ProjectionAssumptionDB::as_select())
            .first::<ProjectionAssumptionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(ProjectionAssumption::from))
    }

    async fn save(&self, assumption: NewProjectionAssumption) -> Result<ProjectionAssumption> {
        self.writer
            .exec(move |conn| -> Result<ProjectionAssumption> {
                let now = Utc::now().naive_utc();

                // The scope (account or family default) owns at most one row
                let existing = match &assumption.account_id {
                    Some(account_id) => projection_assumptions::table
                        .filter(projection_assumptions::account_id.eq(account_id))
                        .select(ProjectionAssumptionDB::as_select())
                        .first::<ProjectionAssumptionDB>(conn)
                        .optional(),
                    None => projection_assumptions::table
                        .filter(projection_assumptions::account_id.is_null())
                        .select(ProjectionAssumptionDB::as_select())
                        .first::<ProjectionAssumptionDB>(conn)
                        .optional(),
                }
                .map_err(StorageError::from)?;

                if let Some(old) = &existing {
                    diesel::delete(projection_assumptions::table.find(&old.id))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }

                let row = ProjectionAssumptionDB::from(ProjectionAssumption {
                    id: assumption
                        .id
                        .or_else(|| existing.as_ref().map(|old| old.id.clone()))
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                    account_id: assumption.account_id,
                    name: assumption.name,
                    expected_return: assumption.expected_return,
                    monthly_contribution: assumption.monthly_contribution,
                    volatility: assumption.volatility,
                    use_pag_defaults: assumption.use_pag_defaults,
                    created_at: existing.as_ref().map_or(now, |old| old.created_at),
                    updated_at: now,
                });
                diesel::insert_into(projection_assumptions::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }
}
