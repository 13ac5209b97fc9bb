//! Fixed-rate amortization.
//!
//! [`LoanPayoffCalculator`] walks the schedule in exact decimal arithmetic:
//! interest is `remaining * annual_rate / 12` and the principal portion is
//! `payment - interest`, with no per-month rounding. The cent-rounded
//! [`monthly_payment`] and [`monthly_interest`] are the statement amounts
//! the debt simulator records in its ledger.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::{DISPLAY_DECIMAL_PRECISION, MONTHS_PER_YEAR};
use crate::errors::{CalculatorError, Result};
use crate::utils::time_utils::month_end_after;

/// Interest charged for one month on `balance` at a nominal annual rate.
pub fn monthly_interest(balance: Decimal, annual_rate: Decimal) -> Decimal {
    (balance * annual_rate / Decimal::from(MONTHS_PER_YEAR)).round_dp(DISPLAY_DECIMAL_PRECISION)
}

/// Level payment that amortizes `principal` over `months` at a nominal annual
/// rate, rounded to cents.
pub fn monthly_payment(principal: Decimal, annual_rate: Decimal, months: u32) -> Result<Decimal> {
    Ok(annuity_payment(principal, annual_rate, months)?.round_dp(DISPLAY_DECIMAL_PRECISION))
}

fn annuity_payment(principal: Decimal, annual_rate: Decimal, months: u32) -> Result<Decimal> {
    if months == 0 {
        return Err(CalculatorError::EmptyLoanTerm.into());
    }
    if principal <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if annual_rate.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    let rate = annual_rate / Decimal::from(MONTHS_PER_YEAR);
    let growth = (Decimal::ONE + rate)
        .checked_powu(u64::from(months))
        .ok_or_else(|| CalculatorError::Overflow(format!("(1 + {})^{}", rate, months)))?;
    let denominator = growth - Decimal::ONE;
    if denominator.is_zero() {
        return Ok(principal / Decimal::from(months));
    }

    Ok(principal * rate * growth / denominator)
}

/// One month of an amortization schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    /// 1-based month index
    pub month: u32,
    pub date: NaiveDate,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    pub remaining_balance: Decimal,
}

/// Walks a fixed-rate, fixed-term loan month by month.
#[derive(Debug, Clone)]
pub struct LoanPayoffCalculator {
    principal: Decimal,
    annual_rate: Decimal,
    term_months: u32,
    payment: Decimal,
}

impl LoanPayoffCalculator {
    /// `principal` is the outstanding balance; its sign is ignored.
    pub fn new(principal: Decimal, annual_rate: Decimal, term_months: u32) -> Result<Self> {
        if annual_rate.is_sign_negative() {
            return Err(crate::Error::invalid_input("Loan rate cannot be negative"));
        }
        let principal = principal.abs();
        let payment = annuity_payment(principal, annual_rate, term_months)?;
        Ok(Self {
            principal,
            annual_rate,
            term_months,
            payment,
        })
    }

    pub fn payment(&self) -> Decimal {
        self.payment
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Full schedule, month 1 dated at the end of the month after `start`.
    ///
    /// Stops early once the balance reaches zero. The last row's remaining
    /// balance is zero up to decimal precision, not forced to it.
    pub fn schedule(&self, start: NaiveDate) -> Vec<AmortizationRow> {
        let monthly_rate = self.annual_rate / Decimal::from(MONTHS_PER_YEAR);
        let mut rows = Vec::with_capacity(self.term_months as usize);
        let mut balance = self.principal;

        for month in 1..=self.term_months {
            if balance <= Decimal::ZERO {
                break;
            }
            let interest = balance * monthly_rate;
            let principal = self.payment - interest;
            balance -= principal;

            rows.push(AmortizationRow {
                month,
                date: month_end_after(start, month),
                payment: self.payment,
                interest,
                principal,
                remaining_balance: balance,
            });
        }
        rows
    }

    /// Date of the first scheduled month whose remaining balance is at or
    /// below `threshold`; `start` itself when the loan is already there.
    ///
    /// `None` when the term ends before the balance gets that low.
    pub fn date_when_balance_at_or_below(
        &self,
        threshold: Decimal,
        start: NaiveDate,
    ) -> Option<NaiveDate> {
        if self.principal <= threshold {
            return Some(start);
        }
        self.schedule(start)
            .into_iter()
            .find(|row| row.remaining_balance <= threshold)
            .map(|row| row.date)
    }

    pub fn total_interest(&self, start: NaiveDate) -> Decimal {
        self.schedule(start).iter().map(|row| row.interest).sum()
    }
}
