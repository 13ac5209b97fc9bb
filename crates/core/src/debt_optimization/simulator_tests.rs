//! Tests for the month-by-month debt simulator.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::auto_stop::{AutoStopRule, AutoStopRuleType};
use super::debt_optimization_model::{LedgerTotals, StrategyType};
use super::simulator::{DebtSimulator, HelocTerms, LoanTerms, SimulationConfig, SimulationInputs};
use crate::loans::monthly_payment;
use crate::test_support::date;

fn mortgage(balance: Decimal) -> LoanTerms {
    LoanTerms {
        balance,
        annual_rate: dec!(0.05),
        term_months: 300,
        original_principal: balance,
        renewal_rate: None,
        renewal_term_months: 60,
        prepayment_privilege_percent: dec!(0.15),
    }
}

fn inputs(strategy_type: StrategyType, months: u32) -> SimulationInputs {
    SimulationInputs {
        strategy_id: "s-1".to_string(),
        strategy_type,
        start_month: date(2026, 11, 1),
        months,
        primary: mortgage(dec!(400000)),
        heloc: Some(HelocTerms {
            opening_balance: Decimal::ZERO,
            annual_rate: dec!(0.07),
            credit_limit: dec!(100000),
        }),
        rental: None,
        rental_income: dec!(2500),
        rental_expenses: dec!(700),
        effective_tax_rate: dec!(0.30),
        rules: Vec::new(),
    }
}

fn rule(rule_type: AutoStopRuleType, threshold: Option<Decimal>, position: i32) -> AutoStopRule {
    AutoStopRule {
        id: format!("rule-{}", position),
        strategy_id: "s-1".to_string(),
        rule_type,
        threshold_value: threshold,
        threshold_unit: rule_type.default_unit(),
        enabled: true,
        position,
    }
}

fn simulator() -> DebtSimulator {
    DebtSimulator::new(SimulationConfig::default())
}

#[test]
fn test_default_config_values() {
    let config = SimulationConfig::default();
    assert_eq!(config.mortgage_rate, dec!(0.05));
    assert_eq!(config.heloc_rate, dec!(0.07));
    assert_eq!(config.term_months, 300);
    assert_eq!(config.heloc_limit, dec!(100000));
    assert_eq!(config.renewal_term_months, 60);
    assert_eq!(config.readvance_ratio, dec!(0.80));
}

#[test]
fn test_baseline_amortizes_primary_only() {
    let outcome = simulator()
        .run(&inputs(StrategyType::Baseline, 300))
        .unwrap();

    assert_eq!(outcome.entries.len(), 300);
    assert_eq!(outcome.stopped_at, None);
    assert!(outcome.entries.iter().all(|e| e.heloc_balance.is_zero()
        && e.heloc_advance.is_zero()
        && e.prepayment.is_zero()
        && e.tax_benefit.is_zero()));
    assert!(outcome
        .entries
        .windows(2)
        .all(|w| w[1].primary_mortgage_balance < w[0].primary_mortgage_balance));
    assert_eq!(
        outcome.entries.last().unwrap().primary_mortgage_balance,
        Decimal::ZERO
    );
}

#[test]
fn test_month_numbers_and_calendar_months() {
    let outcome = simulator().run(&inputs(StrategyType::Baseline, 3)).unwrap();
    let months: Vec<_> = outcome.entries.iter().map(|e| e.month_number).collect();
    let dates: Vec<_> = outcome.entries.iter().map(|e| e.month_date).collect();

    assert_eq!(months, vec![1, 2, 3]);
    assert_eq!(
        dates,
        vec![date(2026, 11, 1), date(2026, 12, 1), date(2027, 1, 1)]
    );
}

#[test]
fn test_first_month_follows_amortization_arithmetic() {
    let outcome = simulator().run(&inputs(StrategyType::Baseline, 1)).unwrap();
    let first = &outcome.entries[0];
    let payment = monthly_payment(dec!(400000), dec!(0.05), 300).unwrap();

    assert_eq!(first.primary_interest, (dec!(400000) * dec!(0.05) / dec!(12)).round_dp(2));
    assert_eq!(first.primary_principal, payment - first.primary_interest);
    assert_eq!(
        first.primary_mortgage_balance,
        dec!(400000) - first.primary_principal
    );
}

#[test]
fn test_renewal_changes_payment_but_keeps_balance_continuity() {
    let mut renewing = inputs(StrategyType::Baseline, 72);
    renewing.primary.renewal_rate = Some(dec!(0.07));
    let entries = simulator().run(&renewing).unwrap().entries;

    let before = &entries[59];
    let after = &entries[60];
    assert!(entries[..60]
        .iter()
        .all(|e| e.primary_payment == entries[0].primary_payment));
    assert!(after.primary_payment > before.primary_payment);
    assert_eq!(
        after.primary_mortgage_balance,
        before.primary_mortgage_balance - after.primary_principal
    );
    assert_eq!(
        after.primary_interest,
        (before.primary_mortgage_balance * dec!(0.07) / dec!(12)).round_dp(2)
    );
}

#[test]
fn test_renewal_without_new_rate_keeps_payment() {
    let entries = simulator()
        .run(&inputs(StrategyType::Baseline, 72))
        .unwrap()
        .entries;

    let drift = (entries[60].primary_payment - entries[59].primary_payment).abs();
    assert!(drift < dec!(1));
}

#[test]
fn test_prepay_only_respects_privilege_cap_per_period() {
    let mut rich = inputs(StrategyType::PrepayOnly, 36);
    rich.rental_income = dec!(20000);
    let entries = simulator().run(&rich).unwrap().entries;

    // 15% of 400000 per twelve-month period
    let cap = dec!(60000);
    for period in entries.chunks(12) {
        let prepaid: Decimal = period.iter().map(|e| e.prepayment).sum();
        assert!(prepaid <= cap);
    }
    let first_year: Decimal = entries[..12].iter().map(|e| e.prepayment).sum();
    assert_eq!(first_year, cap);
    assert!(entries[11].prepayment.is_zero());
    assert!(entries[12].prepayment > Decimal::ZERO);
}

#[test]
fn test_prepay_only_pays_off_sooner_than_baseline() {
    let baseline = simulator().run(&inputs(StrategyType::Baseline, 300)).unwrap();
    let prepay = simulator().run(&inputs(StrategyType::PrepayOnly, 300)).unwrap();

    let baseline_totals = LedgerTotals::from_entries(&baseline.entries);
    let prepay_totals = LedgerTotals::from_entries(&prepay.entries);
    assert!(prepay_totals.payoff_month.unwrap() < baseline_totals.payoff_month.unwrap());
    assert!(prepay_totals.total_interest < baseline_totals.total_interest);
}

#[test]
fn test_prepay_only_ignores_negative_cash_flow() {
    let mut losing = inputs(StrategyType::PrepayOnly, 12);
    losing.rental_expenses = dec!(3000);
    let entries = simulator().run(&losing).unwrap().entries;
    assert!(entries.iter().all(|e| e.prepayment.is_zero()));
    assert!(entries.iter().all(|e| e.net_rental_cash_flow == dec!(-500)));
}

#[test]
fn test_modified_smith_readvances_principal_and_tracks_tax_benefit() {
    let mut lean = inputs(StrategyType::ModifiedSmith, 24);
    lean.rental_income = Decimal::ZERO;
    lean.rental_expenses = Decimal::ZERO;
    let entries = simulator().run(&lean).unwrap().entries;

    assert_eq!(entries[0].heloc_advance, entries[0].primary_principal);
    assert!(entries[0].heloc_interest.is_zero());
    assert_eq!(entries[0].heloc_balance, entries[0].heloc_advance);

    let second = &entries[1];
    assert_eq!(
        second.heloc_interest,
        (entries[0].heloc_balance * dec!(0.07) / dec!(12)).round_dp(2)
    );
    assert_eq!(
        second.tax_benefit,
        (second.heloc_interest * dec!(0.30)).round_dp(2)
    );
    assert_eq!(
        entries[23].invested_amount,
        entries.iter().map(|e| e.heloc_advance).sum::<Decimal>()
    );
}

#[test]
fn test_modified_smith_cash_flow_pays_heloc_first() {
    let entries = simulator()
        .run(&inputs(StrategyType::ModifiedSmith, 12))
        .unwrap()
        .entries;

    // 1800 of monthly cash flow easily covers each month's advance
    assert!(entries.iter().all(|e| e.heloc_balance.is_zero()));
    assert!(entries.iter().all(|e| e.prepayment > Decimal::ZERO));
}

#[test]
fn test_modified_smith_never_exceeds_readvance_cap() {
    let mut capped = inputs(StrategyType::ModifiedSmith, 300);
    capped.rental_income = Decimal::ZERO;
    capped.rental_expenses = Decimal::ZERO;
    capped.heloc = Some(HelocTerms {
        opening_balance: Decimal::ZERO,
        annual_rate: dec!(0.07),
        credit_limit: dec!(500000),
    });
    let entries = simulator().run(&capped).unwrap().entries;

    let cap = dec!(320000);
    assert!(entries.iter().all(|e| e.heloc_balance <= cap));
    assert_eq!(entries.last().unwrap().heloc_balance, cap);
}

#[test]
fn test_modified_smith_cap_follows_credit_limit() {
    let mut limited = inputs(StrategyType::ModifiedSmith, 120);
    limited.rental_income = Decimal::ZERO;
    limited.rental_expenses = Decimal::ZERO;
    limited.heloc = Some(HelocTerms {
        opening_balance: Decimal::ZERO,
        annual_rate: dec!(0.07),
        credit_limit: dec!(20000),
    });
    let entries = simulator().run(&limited).unwrap().entries;

    assert!(entries.iter().all(|e| e.heloc_balance <= dec!(20000)));
    assert!(entries.last().unwrap().heloc_advance.is_zero());
}

#[test]
fn test_auto_stop_or_semantics() {
    let mut with_rules = inputs(StrategyType::ModifiedSmith, 120);
    with_rules.rules = vec![
        rule(AutoStopRuleType::PrimaryPaidOff, None, 0),
        rule(AutoStopRuleType::MaxMonths, Some(dec!(10)), 1),
    ];
    let outcome = simulator().run(&with_rules).unwrap();

    assert_eq!(outcome.stopped_at, Some(10));
    assert_eq!(outcome.entries.len(), 10);
    assert!(outcome.entries[9].is_stop_month);
    assert!(outcome.entries[..9].iter().all(|e| !e.is_stop_month));
}

#[test]
fn test_disabled_rule_does_not_stop() {
    let mut with_rules = inputs(StrategyType::Baseline, 24);
    let mut max_months = rule(AutoStopRuleType::MaxMonths, Some(dec!(6)), 0);
    max_months.enabled = false;
    with_rules.rules = vec![max_months];

    let outcome = simulator().run(&with_rules).unwrap();
    assert_eq!(outcome.stopped_at, None);
    assert_eq!(outcome.entries.len(), 24);
}

#[test]
fn test_negative_cash_flow_stops_immediately() {
    let mut losing = inputs(StrategyType::ModifiedSmith, 24);
    losing.rental_expenses = dec!(4000);
    losing.rules = vec![rule(AutoStopRuleType::NegativeCashFlow, None, 0)];

    let outcome = simulator().run(&losing).unwrap();
    assert_eq!(outcome.stopped_at, Some(1));
    assert_eq!(outcome.entries.len(), 1);
}

#[test]
fn test_rental_mortgage_interest_reduces_cash_flow() {
    let mut with_rental = inputs(StrategyType::PrepayOnly, 2);
    with_rental.rental = Some(mortgage(dec!(200000)));
    let entries = simulator().run(&with_rental).unwrap().entries;

    let rental_interest = (dec!(200000) * dec!(0.05) / dec!(12)).round_dp(2);
    assert_eq!(entries[0].rental_interest, rental_interest);
    assert_eq!(
        entries[0].net_rental_cash_flow,
        dec!(2500) - dec!(700) - rental_interest
    );
    assert!(entries[0].rental_mortgage_balance < dec!(200000));
}

#[test]
fn test_simulation_is_deterministic() {
    let run = inputs(StrategyType::ModifiedSmith, 60);
    assert_eq!(simulator().run(&run).unwrap(), simulator().run(&run).unwrap());
}

#[test]
fn test_empty_term_is_rejected() {
    let mut broken = inputs(StrategyType::Baseline, 12);
    broken.primary.term_months = 0;
    assert!(simulator().run(&broken).is_err());
}

#[test]
fn test_as_baseline_drops_rules_and_heloc_activity() {
    let mut with_rules = inputs(StrategyType::ModifiedSmith, 12);
    with_rules.rules = vec![rule(AutoStopRuleType::MaxMonths, Some(dec!(2)), 0)];
    let baseline = with_rules.as_baseline();

    assert_eq!(baseline.strategy_type, StrategyType::Baseline);
    assert!(baseline.rules.is_empty());
    let outcome = simulator().run(&baseline).unwrap();
    assert_eq!(outcome.entries.len(), 12);
}
