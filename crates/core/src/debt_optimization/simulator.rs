//! Month-by-month debt simulation shared by every strategy type.
//!
//! Each month: renew loans whose term is up, amortize the primary and rental
//! mortgages, derive net rental cash flow, apply the strategy step, then
//! evaluate auto-stop rules. The run is pure and deterministic.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::auto_stop::{first_triggered, AutoStopRule, RuleContext};
use super::debt_optimization_constants::{
    DEFAULT_EFFECTIVE_TAX_RATE, DEFAULT_HELOC_LIMIT, DEFAULT_HELOC_RATE, DEFAULT_MORTGAGE_RATE,
    DEFAULT_PREPAYMENT_PRIVILEGE_PERCENT, DEFAULT_PRIVILEGE_PERIOD_MONTHS,
    DEFAULT_READVANCE_RATIO, DEFAULT_RENEWAL_TERM_MONTHS, DEFAULT_TERM_MONTHS,
};
use super::debt_optimization_model::{LedgerEntry, StrategyType};
use crate::accounts::Account;
use crate::constants::DISPLAY_DECIMAL_PRECISION;
use crate::errors::{CalculatorError, Result};
use crate::loans::{monthly_interest, monthly_payment};
use crate::utils::time_utils::month_start_after;

/// Defaults applied when accounts or strategies leave a parameter unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub mortgage_rate: Decimal,
    pub heloc_rate: Decimal,
    pub term_months: u32,
    pub heloc_limit: Decimal,
    pub renewal_term_months: u32,
    pub readvance_ratio: Decimal,
    pub prepayment_privilege_percent: Decimal,
    pub privilege_period_months: u32,
    pub effective_tax_rate: Decimal,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mortgage_rate: DEFAULT_MORTGAGE_RATE,
            heloc_rate: DEFAULT_HELOC_RATE,
            term_months: DEFAULT_TERM_MONTHS,
            heloc_limit: DEFAULT_HELOC_LIMIT,
            renewal_term_months: DEFAULT_RENEWAL_TERM_MONTHS,
            readvance_ratio: DEFAULT_READVANCE_RATIO,
            prepayment_privilege_percent: DEFAULT_PREPAYMENT_PRIVILEGE_PERCENT,
            privilege_period_months: DEFAULT_PRIVILEGE_PERIOD_MONTHS,
            effective_tax_rate: DEFAULT_EFFECTIVE_TAX_RATE,
        }
    }
}

/// Amortizing mortgage as it stands when the simulation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub balance: Decimal,
    pub annual_rate: Decimal,
    /// Remaining amortization
    pub term_months: u32,
    pub original_principal: Decimal,
    /// Rate taken at each renewal; the current rate is kept when absent
    pub renewal_rate: Option<Decimal>,
    /// Months between renewals, 0 for never
    pub renewal_term_months: u32,
    pub prepayment_privilege_percent: Decimal,
}

impl LoanTerms {
    pub fn from_account(account: &Account, config: &SimulationConfig) -> Self {
        let loan = account.loan.clone().unwrap_or_default();
        let balance = account.outstanding_balance();
        Self {
            balance,
            annual_rate: loan.annual_rate.unwrap_or(config.mortgage_rate),
            term_months: loan.term_months.unwrap_or(config.term_months),
            original_principal: loan
                .original_principal
                .map(|principal| principal.abs())
                .unwrap_or(balance),
            renewal_rate: loan.renewal_rate,
            renewal_term_months: loan
                .renewal_term_months
                .unwrap_or(config.renewal_term_months),
            prepayment_privilege_percent: loan
                .prepayment_privilege_percent
                .unwrap_or(config.prepayment_privilege_percent),
        }
    }
}

/// Revolving line of credit drawn by the leveraged strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HelocTerms {
    pub opening_balance: Decimal,
    pub annual_rate: Decimal,
    pub credit_limit: Decimal,
}

impl HelocTerms {
    pub fn from_account(account: &Account, config: &SimulationConfig) -> Self {
        let loan = account.loan.clone().unwrap_or_default();
        Self {
            opening_balance: account.outstanding_balance(),
            annual_rate: loan.annual_rate.unwrap_or(config.heloc_rate),
            credit_limit: loan.credit_limit.unwrap_or(config.heloc_limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    pub strategy_id: String,
    pub strategy_type: StrategyType,
    /// First calendar month simulated
    pub start_month: NaiveDate,
    pub months: u32,
    pub primary: LoanTerms,
    pub heloc: Option<HelocTerms>,
    pub rental: Option<LoanTerms>,
    pub rental_income: Decimal,
    pub rental_expenses: Decimal,
    pub effective_tax_rate: Decimal,
    /// Evaluated in order; the first one that triggers ends the run
    pub rules: Vec<AutoStopRule>,
}

impl SimulationInputs {
    /// Same loans under plain amortization with no rules, for comparison.
    pub fn as_baseline(&self) -> Self {
        Self {
            strategy_type: StrategyType::Baseline,
            rules: Vec::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutcome {
    pub entries: Vec<LedgerEntry>,
    pub stopped_at: Option<u32>,
}

#[derive(Debug, Default, Clone, Copy)]
struct MonthlyStep {
    payment: Decimal,
    interest: Decimal,
    principal: Decimal,
}

#[derive(Debug)]
struct AmortizingLoan {
    balance: Decimal,
    rate: Decimal,
    payment: Decimal,
    remaining_term: u32,
    renewal_rate: Option<Decimal>,
    renewal_term_months: u32,
}

impl AmortizingLoan {
    fn new(terms: &LoanTerms) -> Result<Self> {
        if terms.term_months == 0 {
            return Err(CalculatorError::EmptyLoanTerm.into());
        }
        Ok(Self {
            balance: terms.balance,
            rate: terms.annual_rate,
            payment: monthly_payment(terms.balance, terms.annual_rate, terms.term_months)?,
            remaining_term: terms.term_months,
            renewal_rate: terms.renewal_rate,
            renewal_term_months: terms.renewal_term_months,
        })
    }

    fn is_renewal_month(&self, month: u32) -> bool {
        self.renewal_term_months > 0 && month > 1 && (month - 1) % self.renewal_term_months == 0
    }

    /// Resets the rate and re-amortizes what is left over the remaining term.
    fn renew(&mut self) -> Result<()> {
        if let Some(rate) = self.renewal_rate {
            self.rate = rate;
        }
        if self.remaining_term > 0 && self.balance > Decimal::ZERO {
            self.payment = monthly_payment(self.balance, self.rate, self.remaining_term)?;
        }
        Ok(())
    }

    fn amortize(&mut self) -> MonthlyStep {
        if self.balance <= Decimal::ZERO {
            return MonthlyStep::default();
        }
        let interest = monthly_interest(self.balance, self.rate);
        let mut principal = (self.payment - interest).max(Decimal::ZERO);
        if self.remaining_term <= 1 || principal >= self.balance {
            principal = self.balance;
        }
        self.balance -= principal;
        self.remaining_term = self.remaining_term.saturating_sub(1);

        MonthlyStep {
            payment: principal + interest,
            interest,
            principal,
        }
    }

    fn prepay(&mut self, amount: Decimal) -> Decimal {
        let applied = amount.min(self.balance).max(Decimal::ZERO);
        self.balance -= applied;
        applied
    }
}

/// Prepayment allowance, refreshed at the start of each privilege period.
#[derive(Debug)]
struct PrepaymentPrivilege {
    cap: Decimal,
    period_months: u32,
    period: u32,
    used: Decimal,
}

impl PrepaymentPrivilege {
    fn new(terms: &LoanTerms, period_months: u32) -> Self {
        Self {
            cap: (terms.original_principal * terms.prepayment_privilege_percent)
                .round_dp(DISPLAY_DECIMAL_PRECISION),
            period_months: period_months.max(1),
            period: 0,
            used: Decimal::ZERO,
        }
    }

    fn remaining(&mut self, month: u32) -> Decimal {
        let period = (month - 1) / self.period_months;
        if period != self.period {
            self.period = period;
            self.used = Decimal::ZERO;
        }
        (self.cap - self.used).max(Decimal::ZERO)
    }

    fn record(&mut self, amount: Decimal) {
        self.used += amount;
    }
}

/// Runs strategies against a fixed set of defaults.
#[derive(Debug, Clone, Default)]
pub struct DebtSimulator {
    config: SimulationConfig,
}

impl DebtSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Ceiling on the HELOC balance: the readvanceable share of the
    /// original mortgage, never more than the credit limit.
    pub fn readvance_cap(&self, primary: &LoanTerms, credit_limit: Decimal) -> Decimal {
        (primary.original_principal * self.config.readvance_ratio)
            .round_dp(DISPLAY_DECIMAL_PRECISION)
            .min(credit_limit)
    }

    pub fn run(&self, inputs: &SimulationInputs) -> Result<SimulationOutcome> {
        let mut primary = AmortizingLoan::new(&inputs.primary)?;
        let mut rental = inputs
            .rental
            .as_ref()
            .map(AmortizingLoan::new)
            .transpose()?;
        let mut privilege =
            PrepaymentPrivilege::new(&inputs.primary, self.config.privilege_period_months);

        let heloc = inputs.heloc.unwrap_or(HelocTerms {
            opening_balance: Decimal::ZERO,
            annual_rate: self.config.heloc_rate,
            credit_limit: self.config.heloc_limit,
        });
        let readvance_cap = self.readvance_cap(&inputs.primary, heloc.credit_limit);
        let context = RuleContext {
            heloc_credit_limit: heloc.credit_limit,
        };

        let mut heloc_balance = if inputs.strategy_type.uses_heloc() {
            heloc.opening_balance
        } else {
            Decimal::ZERO
        };
        let mut invested = Decimal::ZERO;
        let mut entries = Vec::with_capacity(inputs.months as usize);
        let mut stopped_at = None;

        for month in 1..=inputs.months {
            if primary.is_renewal_month(month) {
                primary.renew()?;
            }
            if let Some(loan) = rental.as_mut() {
                if loan.is_renewal_month(month) {
                    loan.renew()?;
                }
            }

            let step = primary.amortize();
            let rental_interest = rental
                .as_mut()
                .map(|loan| loan.amortize().interest)
                .unwrap_or(Decimal::ZERO);
            let net_rental_cash_flow =
                inputs.rental_income - inputs.rental_expenses - rental_interest;

            let mut heloc_interest = Decimal::ZERO;
            let mut heloc_advance = Decimal::ZERO;
            let mut prepayment = Decimal::ZERO;
            let mut tax_benefit = Decimal::ZERO;

            match inputs.strategy_type {
                StrategyType::Baseline => {}
                StrategyType::PrepayOnly => {
                    let allowance = privilege.remaining(month);
                    prepayment = primary.prepay(net_rental_cash_flow.min(allowance));
                    privilege.record(prepayment);
                }
                StrategyType::ModifiedSmith => {
                    heloc_interest = monthly_interest(heloc_balance, heloc.annual_rate);

                    // Re-borrow what the mortgage payment freed, up to the readvanceable cap
                    heloc_advance = step
                        .principal
                        .min((readvance_cap - heloc_balance).max(Decimal::ZERO));
                    heloc_balance += heloc_advance;
                    invested += heloc_advance;

                    // Rental cash services the HELOC before anything is prepaid
                    let mut cash = net_rental_cash_flow - heloc_interest;
                    if cash > Decimal::ZERO {
                        let paydown = cash.min(heloc_balance);
                        heloc_balance -= paydown;
                        cash -= paydown;
                    }
                    if cash > Decimal::ZERO {
                        let allowance = privilege.remaining(month);
                        prepayment = primary.prepay(cash.min(allowance));
                        privilege.record(prepayment);
                    }

                    tax_benefit = (heloc_interest * inputs.effective_tax_rate)
                        .round_dp(DISPLAY_DECIMAL_PRECISION);
                }
            }

            let mut entry = LedgerEntry {
                strategy_id: inputs.strategy_id.clone(),
                month_number: month,
                month_date: month_start_after(inputs.start_month, month - 1),
                primary_mortgage_balance: primary.balance,
                heloc_balance,
                rental_mortgage_balance: rental
                    .as_ref()
                    .map_or(Decimal::ZERO, |loan| loan.balance),
                primary_payment: step.payment,
                primary_interest: step.interest,
                primary_principal: step.principal,
                heloc_interest,
                rental_interest,
                heloc_advance,
                prepayment,
                net_rental_cash_flow,
                tax_benefit,
                invested_amount: invested,
                is_stop_month: false,
            };

            let stop = first_triggered(&inputs.rules, &entry, &context).is_some();
            if stop {
                entry.is_stop_month = true;
                stopped_at = Some(month);
            }
            entries.push(entry);
            if stop {
                break;
            }
        }

        Ok(SimulationOutcome {
            entries,
            stopped_at,
        })
    }
}
