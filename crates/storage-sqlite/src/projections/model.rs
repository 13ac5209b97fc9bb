//! Database models for projections.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use wealthcast_core::projections::{
    NewProjection, PercentileBands, Projection, ProjectionAssumption,
};

use crate::utils::{optional_decimal_to_string, parse_decimal, parse_optional_decimal};

#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::projections)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectionDB {
    pub id: String,
    pub account_id: String,
    pub projection_date: NaiveDate,
    pub projected_balance: String,
    pub currency: String,
    pub contribution: Option<String>,
    pub p10: Option<String>,
    pub p25: Option<String>,
    pub p50: Option<String>,
    pub p75: Option<String>,
    pub p90: Option<String>,
    pub actual_balance: Option<String>,
    pub is_adaptive: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::projections)]
pub struct NewProjectionDB {
    pub id: String,
    pub account_id: String,
    pub projection_date: NaiveDate,
    pub projected_balance: String,
    pub currency: String,
    pub contribution: Option<String>,
    pub p10: Option<String>,
    pub p25: Option<String>,
    pub p50: Option<String>,
    pub p75: Option<String>,
    pub p90: Option<String>,
    pub is_adaptive: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewProjectionDB {
    pub fn from_domain(domain: NewProjection, id: String, now: NaiveDateTime) -> Self {
        let band = |pick: fn(&PercentileBands) -> rust_decimal::Decimal| {
            domain.percentiles.as_ref().map(|b| pick(b).to_string())
        };
        Self {
            p10: band(|b| b.p10),
            p25: band(|b| b.p25),
            p50: band(|b| b.p50),
            p75: band(|b| b.p75),
            p90: band(|b| b.p90),
            id,
            account_id: domain.account_id,
            projection_date: domain.projection_date,
            projected_balance: domain.projected_balance.to_string(),
            currency: domain.currency,
            contribution: optional_decimal_to_string(domain.contribution),
            is_adaptive: domain.is_adaptive,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<ProjectionDB> for Projection {
    fn from(db: ProjectionDB) -> Self {
        // Bands are stored all-or-nothing
        let percentiles = match (&db.p10, &db.p25, &db.p50, &db.p75, &db.p90) {
            (Some(p10), Some(p25), Some(p50), Some(p75), Some(p90)) => Some(PercentileBands {
                p10: parse_decimal(p10, "p10"),
                p25: parse_decimal(p25, "p25"),
                p50: parse_decimal(p50, "p50"),
                p75: parse_decimal(p75, "p75"),
                p90: parse_decimal(p90, "p90"),
            }),
            _ => None,
        };
        Self {
            percentiles,
            projected_balance: parse_decimal(&db.projected_balance, "projected_balance"),
            contribution: parse_optional_decimal(db.contribution.as_deref(), "contribution"),
            actual_balance: parse_optional_decimal(db.actual_balance.as_deref(), "actual_balance"),
            id: db.id,
            account_id: db.account_id,
            projection_date: db.projection_date,
            currency: db.currency,
            is_adaptive: db.is_adaptive,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::projection_assumptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProjectionAssumptionDB {
    pub id: String,
    pub account_id: Option<String>,
    pub name: String,
    pub expected_return: Option<String>,
    pub monthly_contribution: Option<String>,
    pub volatility: Option<String>,
    pub use_pag_defaults: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<ProjectionAssumptionDB> for ProjectionAssumption {
    fn from(db: ProjectionAssumptionDB) -> Self {
        Self {
            expected_return: parse_optional_decimal(db.expected_return.as_deref(), "expected_return"),
            monthly_contribution: parse_optional_decimal(
                db.monthly_contribution.as_deref(),
                "monthly_contribution",
            ),
            volatility: parse_optional_decimal(db.volatility.as_deref(), "volatility"),
            id: db.id,
            account_id: db.account_id,
            name: db.name,
            use_pag_defaults: db.use_pag_defaults,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<ProjectionAssumption> for ProjectionAssumptionDB {
    fn from(domain: ProjectionAssumption) -> Self {
        Self {
            id: domain.id,
            account_id: domain.account_id,
            name: domain.name,
            expected_return: optional_decimal_to_string(domain.expected_return),
            monthly_contribution: optional_decimal_to_string(domain.monthly_contribution),
            volatility: optional_decimal_to_string(domain.volatility),
            use_pag_defaults: domain.use_pag_defaults,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}
