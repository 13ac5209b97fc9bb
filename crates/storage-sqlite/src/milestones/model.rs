//! Database model for milestones.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use log::warn;

use wealthcast_core::milestones::{Milestone, MilestoneStatus};

use crate::utils::parse_decimal;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::milestones)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MilestoneDB {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub target_amount: String,
    pub starting_balance: String,
    pub status: String,
    pub is_reduction: bool,
    pub projected_date: Option<NaiveDate>,
    pub achieved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<MilestoneDB> for Milestone {
    fn from(db: MilestoneDB) -> Self {
        let status = db.status.parse::<MilestoneStatus>().unwrap_or_else(|e| {
            warn!("Milestone {}: {}; treating as pending", db.id, e);
            MilestoneStatus::Pending
        });
        Self {
            status,
            target_amount: parse_decimal(&db.target_amount, "target_amount"),
            starting_balance: parse_decimal(&db.starting_balance, "starting_balance"),
            id: db.id,
            account_id: db.account_id,
            name: db.name,
            is_reduction: db.is_reduction,
            projected_date: db.projected_date,
            achieved_at: db.achieved_at,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<Milestone> for MilestoneDB {
    fn from(domain: Milestone) -> Self {
        Self {
            id: domain.id,
            account_id: domain.account_id,
            name: domain.name,
            target_amount: domain.target_amount.to_string(),
            starting_balance: domain.starting_balance.to_string(),
            status: domain.status.as_str().to_string(),
            is_reduction: domain.is_reduction,
            projected_date: domain.projected_date,
            achieved_at: domain.achieved_at,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
