//! Milestone domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneStatus {
    #[default]
    Pending,
    InProgress,
    Achieved,
}

impl MilestoneStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneStatus::Pending => "pending",
            MilestoneStatus::InProgress => "in_progress",
            MilestoneStatus::Achieved => "achieved",
        }
    }
}

impl fmt::Display for MilestoneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(MilestoneStatus::Pending),
            "in_progress" => Ok(MilestoneStatus::InProgress),
            "achieved" => Ok(MilestoneStatus::Achieved),
            other => Err(Error::invalid_input(format!(
                "Unknown milestone status '{}'",
                other
            ))),
        }
    }
}

/// A balance target on one account.
///
/// Reduction milestones (debts) are reached when the outstanding balance
/// falls to the target; growth milestones when the balance rises to it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub target_amount: Decimal,
    /// Comparable balance when the milestone was created
    pub starting_balance: Decimal,
    pub status: MilestoneStatus,
    pub is_reduction: bool,
    pub projected_date: Option<NaiveDate>,
    pub achieved_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Milestone {
    pub fn is_open(&self) -> bool {
        self.status != MilestoneStatus::Achieved
    }

    /// Whether `balance` has crossed the target in the favourable direction.
    pub fn is_reached_by(&self, balance: Decimal) -> bool {
        if self.is_reduction {
            balance <= self.target_amount
        } else {
            balance >= self.target_amount
        }
    }

    /// Status implied by `balance`. Achieved milestones stay achieved.
    pub fn status_for(&self, balance: Decimal) -> MilestoneStatus {
        if !self.is_open() || self.is_reached_by(balance) {
            return MilestoneStatus::Achieved;
        }
        let progressed = if self.is_reduction {
            balance < self.starting_balance
        } else {
            balance > self.starting_balance
        };
        if progressed {
            MilestoneStatus::InProgress
        } else {
            MilestoneStatus::Pending
        }
    }

    /// Share of the distance from start to target covered so far, 0..=100.
    pub fn progress_percentage(&self, balance: Decimal) -> Decimal {
        let total = (self.target_amount - self.starting_balance).abs();
        if total.is_zero() || self.is_reached_by(balance) {
            return Decimal::ONE_HUNDRED;
        }
        let covered = if self.is_reduction {
            self.starting_balance - balance
        } else {
            balance - self.starting_balance
        };
        (covered / total * Decimal::ONE_HUNDRED)
            .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
            .round_dp(2)
    }
}

/// Input model for creating a milestone.
///
/// Direction and starting balance are taken from the account, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMilestone {
    pub id: Option<String>,
    pub account_id: String,
    pub name: String,
    pub target_amount: Decimal,
}

impl NewMilestone {
    pub fn validate(&self) -> Result<()> {
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "account_id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        if self.target_amount <= Decimal::ZERO {
            return Err(Error::invalid_input(
                "Milestone target must be greater than zero",
            ));
        }
        Ok(())
    }
}
