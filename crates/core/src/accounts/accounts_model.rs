//! Account domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts_constants::{is_amortizing_loan_type, is_liability_type, is_valid_account_type};
use crate::{errors::ValidationError, Error, Result};

/// Loan terms attached to an account that wraps a mortgage, HELOC or loan.
///
/// Every field is optional; consumers fall back to configured defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanDetails {
    /// Annual interest rate as a decimal (0.05 = 5%)
    pub annual_rate: Option<Decimal>,
    /// Remaining amortization in months
    pub term_months: Option<u32>,
    /// Principal at origination, used for prepayment privileges
    pub original_principal: Option<Decimal>,
    /// Months between rate renewals
    pub renewal_term_months: Option<u32>,
    /// Rate applied at renewal; the current rate is kept when absent
    pub renewal_rate: Option<Decimal>,
    /// Share of original principal that may be prepaid per privilege year
    pub prepayment_privilege_percent: Option<Decimal>,
    /// Credit limit for revolving facilities such as a HELOC
    pub credit_limit: Option<Decimal>,
}

/// Domain model representing an account in the system.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    /// Current balance. Liabilities may be stored negative; compare with
    /// [`Account::outstanding_balance`].
    pub balance: Decimal,
    pub is_active: bool,
    pub loan: Option<LoanDetails>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    pub fn is_liability(&self) -> bool {
        is_liability_type(&self.account_type)
    }

    /// Balance magnitude, regardless of the sign convention used for debts.
    pub fn outstanding_balance(&self) -> Decimal {
        self.balance.abs()
    }

    /// Balance in the orientation milestones compare against: absolute for
    /// liabilities, signed for assets.
    pub fn comparable_balance(&self) -> Decimal {
        if self.is_liability() {
            self.outstanding_balance()
        } else {
            self.balance
        }
    }

    /// True when the account carries enough loan terms to amortize.
    pub fn is_loan_backed(&self) -> bool {
        is_amortizing_loan_type(&self.account_type)
            && self
                .loan
                .as_ref()
                .is_some_and(|loan| loan.annual_rate.is_some() && loan.term_months.is_some())
    }
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub currency: String,
    pub balance: Decimal,
    pub is_active: bool,
    pub loan: Option<LoanDetails>,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Currency cannot be empty".to_string(),
            )));
        }
        if !is_valid_account_type(&self.account_type) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown account type '{}'",
                self.account_type
            ))));
        }
        if let Some(loan) = &self.loan {
            if loan.term_months == Some(0) {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Loan term must be at least one month".to_string(),
                )));
            }
            if loan.annual_rate.is_some_and(|rate| rate.is_sign_negative()) {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Loan rate cannot be negative".to_string(),
                )));
            }
        }
        Ok(())
    }
}

/// A recorded balance on a given date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: Decimal,
}
