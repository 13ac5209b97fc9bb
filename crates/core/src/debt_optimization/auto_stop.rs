//! Rules that end a simulation early.
//!
//! Rule types form a closed set. Unknown tags are refused when a rule is
//! created and skipped when stored rules are loaded, so one bad row cannot
//! halt an otherwise valid simulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::debt_optimization_model::LedgerEntry;
use crate::errors::{Error, Result, ValidationError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AutoStopRuleType {
    /// HELOC balance at or above a percentage of its credit limit
    HelocLimitPercentage,
    PrimaryPaidOff,
    AllDebtPaidOff,
    /// Month index at or above the threshold
    MaxMonths,
    NegativeCashFlow,
    HelocInterestExceedsBenefit,
}

impl AutoStopRuleType {
    pub const ALL: [AutoStopRuleType; 6] = [
        AutoStopRuleType::HelocLimitPercentage,
        AutoStopRuleType::PrimaryPaidOff,
        AutoStopRuleType::AllDebtPaidOff,
        AutoStopRuleType::MaxMonths,
        AutoStopRuleType::NegativeCashFlow,
        AutoStopRuleType::HelocInterestExceedsBenefit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AutoStopRuleType::HelocLimitPercentage => "heloc_limit_percentage",
            AutoStopRuleType::PrimaryPaidOff => "primary_paid_off",
            AutoStopRuleType::AllDebtPaidOff => "all_debt_paid_off",
            AutoStopRuleType::MaxMonths => "max_months",
            AutoStopRuleType::NegativeCashFlow => "negative_cash_flow",
            AutoStopRuleType::HelocInterestExceedsBenefit => "heloc_interest_exceeds_benefit",
        }
    }

    /// `None` for tags this build does not know.
    pub fn parse_lenient(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    pub fn requires_threshold(&self) -> bool {
        matches!(
            self,
            AutoStopRuleType::HelocLimitPercentage | AutoStopRuleType::MaxMonths
        )
    }

    pub fn default_unit(&self) -> ThresholdUnit {
        match self {
            AutoStopRuleType::HelocLimitPercentage => ThresholdUnit::Percentage,
            AutoStopRuleType::MaxMonths => ThresholdUnit::Months,
            _ => ThresholdUnit::Amount,
        }
    }
}

impl fmt::Display for AutoStopRuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoStopRuleType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_lenient(s).ok_or_else(|| {
            Error::invalid_input(format!("Unknown auto-stop rule type '{}'", s))
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdUnit {
    Percentage,
    Months,
    #[default]
    Amount,
}

impl ThresholdUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdUnit::Percentage => "percentage",
            ThresholdUnit::Months => "months",
            ThresholdUnit::Amount => "amount",
        }
    }
}

impl FromStr for ThresholdUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "percentage" => Ok(ThresholdUnit::Percentage),
            "months" => Ok(ThresholdUnit::Months),
            "amount" => Ok(ThresholdUnit::Amount),
            other => Err(Error::invalid_input(format!(
                "Unknown threshold unit '{}'",
                other
            ))),
        }
    }
}

/// Facts about the simulation that a ledger entry does not carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleContext {
    pub heloc_credit_limit: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AutoStopRule {
    pub id: String,
    pub strategy_id: String,
    pub rule_type: AutoStopRuleType,
    pub threshold_value: Option<Decimal>,
    pub threshold_unit: ThresholdUnit,
    pub enabled: bool,
    pub position: i32,
}

impl AutoStopRule {
    /// Whether this month's state meets the rule. Disabled rules never trigger.
    pub fn is_triggered(&self, entry: &LedgerEntry, context: &RuleContext) -> bool {
        if !self.enabled {
            return false;
        }
        match self.rule_type {
            AutoStopRuleType::HelocLimitPercentage => match self.threshold_value {
                Some(percent) if context.heloc_credit_limit > Decimal::ZERO => {
                    entry.heloc_balance
                        >= context.heloc_credit_limit * percent / Decimal::ONE_HUNDRED
                }
                _ => false,
            },
            AutoStopRuleType::PrimaryPaidOff => entry.primary_mortgage_balance.is_zero(),
            AutoStopRuleType::AllDebtPaidOff => {
                entry.primary_mortgage_balance.is_zero()
                    && entry.heloc_balance.is_zero()
                    && entry.rental_mortgage_balance.is_zero()
            }
            AutoStopRuleType::MaxMonths => self
                .threshold_value
                .is_some_and(|months| Decimal::from(entry.month_number) >= months),
            AutoStopRuleType::NegativeCashFlow => entry.net_rental_cash_flow < Decimal::ZERO,
            AutoStopRuleType::HelocInterestExceedsBenefit => {
                entry.heloc_interest > entry.tax_benefit
            }
        }
    }
}

/// First enabled rule that triggers for the month, in `rules` order.
pub fn first_triggered<'a>(
    rules: &'a [AutoStopRule],
    entry: &LedgerEntry,
    context: &RuleContext,
) -> Option<&'a AutoStopRule> {
    rules.iter().find(|rule| rule.is_triggered(entry, context))
}

/// Input model for attaching a rule to a strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAutoStopRule {
    pub strategy_id: String,
    pub rule_type: String,
    pub threshold_value: Option<Decimal>,
    pub threshold_unit: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewAutoStopRule {
    /// Parses and checks the rule, returning its typed parts.
    pub fn validate(&self) -> Result<(AutoStopRuleType, ThresholdUnit)> {
        if self.strategy_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "strategy_id".to_string(),
            )));
        }
        let rule_type: AutoStopRuleType = self.rule_type.parse()?;
        let unit: ThresholdUnit = match &self.threshold_unit {
            Some(unit) => unit.parse()?,
            None => rule_type.default_unit(),
        };

        if rule_type.requires_threshold() {
            match self.threshold_value {
                Some(value) if value > Decimal::ZERO => {}
                _ => {
                    return Err(Error::invalid_input(format!(
                        "Rule '{}' needs a positive threshold",
                        rule_type
                    )))
                }
            }
            if unit != rule_type.default_unit() {
                return Err(Error::invalid_input(format!(
                    "Rule '{}' is measured in {}",
                    rule_type,
                    rule_type.default_unit().as_str()
                )));
            }
        }
        Ok((rule_type, unit))
    }
}
