use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use wealthcast_core::milestones::{Milestone, MilestoneRepositoryTrait};
use wealthcast_core::Result;

use super::model::MilestoneDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::milestones;

pub struct MilestoneRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl MilestoneRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl MilestoneRepositoryTrait for MilestoneRepository {
    async fn insert(&self, milestone: Milestone) -> Result<Milestone> {
        self.writer
            .exec(move |conn| -> Result<Milestone> {
                let row = diesel::insert_into(milestones::table)
                    .values(MilestoneDB::from(milestone))
                    .returning(MilestoneDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    fn get_by_id(&self, milestone_id: &str) -> Result<Milestone> {
        let mut conn = get_connection(&self.pool)?;
        let row = milestones::table
            .find(milestone_id)
            .select(MilestoneDB::as_select())
            .first::<MilestoneDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    fn list_for_account(&self, account_id: &str) -> Result<Vec<Milestone>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = milestones::table
            .filter(milestones::account_id.eq(account_id))
            .select(MilestoneDB::as_select())
            .load::<MilestoneDB>(&mut conn)
            .map_err(StorageError::from)?;

        // Targets are decimal text, so order numerically here rather than in SQL
        let mut result: Vec<Milestone> = rows.into_iter().map(Milestone::from).collect();
        result.sort_by(|a, b| a.target_amount.cmp(&b.target_amount));
        Ok(result)
    }

    async fn update_many(&self, updated: Vec<Milestone>) -> Result<usize> {
        self.writer
            .exec(move |conn| -> Result<usize> {
                let mut affected = 0;
                for milestone in updated {
                    let row = MilestoneDB::from(milestone);
                    affected += diesel::update(milestones::table.find(&row.id))
                        .set((
                            milestones::status.eq(&row.status),
                            milestones::projected_date.eq(row.projected_date),
                            milestones::achieved_at.eq(row.achieved_at),
                            milestones::updated_at.eq(row.updated_at),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(affected)
            })
            .await
    }

    async fn delete(&self, milestone_id: &str) -> Result<usize> {
        let milestone_id = milestone_id.to_string();
        self.writer
            .exec(move |conn| -> Result<usize> {
                Ok(diesel::delete(milestones::table.find(milestone_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}
