use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info};
use std::sync::Arc;
use uuid::Uuid;

use super::auto_stop::{AutoStopRule, NewAutoStopRule};
use super::debt_optimization_model::{
    DebtOptimizationStrategy, LedgerEntry, LedgerTotals, NewDebtOptimizationStrategy,
    SimulationSummary, StrategyStatus,
};
use super::debt_optimization_traits::{
    DebtOptimizationRepositoryTrait, DebtOptimizationServiceTrait,
};
use super::simulator::{DebtSimulator, HelocTerms, LoanTerms, SimulationConfig, SimulationInputs};
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::errors::{Error, Result};
use crate::utils::time_utils::month_start_after;
use crate::utils::Clock;

pub struct DebtOptimizationService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    repository: Arc<dyn DebtOptimizationRepositoryTrait>,
    simulator: DebtSimulator,
    clock: Arc<dyn Clock>,
}

impl DebtOptimizationService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        repository: Arc<dyn DebtOptimizationRepositoryTrait>,
        config: SimulationConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repository,
            repository,
            simulator: DebtSimulator::new(config),
            clock,
        }
    }

    fn load_liability(&self, account_id: &str) -> Result<Account> {
        let account = self.account_repository.get_by_id(account_id)?;
        if !account.is_liability() {
            return Err(Error::invalid_input(format!(
                "Account {} is not a debt account",
                account_id
            )));
        }
        Ok(account)
    }

    fn build_inputs(
        &self,
        strategy: &DebtOptimizationStrategy,
        rules: Vec<AutoStopRule>,
    ) -> Result<SimulationInputs> {
        let config = self.simulator.config();
        let primary = self.load_liability(&strategy.primary_mortgage_account_id)?;
        let heloc = strategy
            .heloc_account_id
            .as_deref()
            .map(|id| self.load_liability(id))
            .transpose()?;
        let rental = strategy
            .rental_mortgage_account_id
            .as_deref()
            .map(|id| self.load_liability(id))
            .transpose()?;

        Ok(SimulationInputs {
            strategy_id: strategy.id.clone(),
            strategy_type: strategy.strategy_type,
            start_month: month_start_after(self.clock.today(), 1),
            months: strategy.simulation_months,
            primary: LoanTerms::from_account(&primary, config),
            heloc: heloc.map(|account| HelocTerms::from_account(&account, config)),
            rental: rental.map(|account| LoanTerms::from_account(&account, config)),
            rental_income: strategy.rental_income,
            rental_expenses: strategy.rental_expenses,
            effective_tax_rate: strategy
                .effective_tax_rate
                .unwrap_or(config.effective_tax_rate),
            rules,
        })
    }

    async fn mark_failed(&self, mut strategy: DebtOptimizationStrategy) -> Result<()> {
        strategy.status = StrategyStatus::Failed;
        strategy.updated_at = Utc::now().naive_utc();
        self.repository.update_strategy(strategy).await?;
        Ok(())
    }
}

#[async_trait]
impl DebtOptimizationServiceTrait for DebtOptimizationService {
    async fn create_strategy(
        &self,
        new_strategy: NewDebtOptimizationStrategy,
    ) -> Result<DebtOptimizationStrategy> {
        new_strategy.validate()?;
        self.load_liability(&new_strategy.primary_mortgage_account_id)?;
        for account_id in [
            &new_strategy.heloc_account_id,
            &new_strategy.rental_mortgage_account_id,
        ]
        .into_iter()
        .flatten()
        {
            self.load_liability(account_id)?;
        }

        let now = Utc::now().naive_utc();
        let strategy = DebtOptimizationStrategy {
            id: new_strategy
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: new_strategy.name,
            strategy_type: new_strategy.strategy_type,
            primary_mortgage_account_id: new_strategy.primary_mortgage_account_id,
            heloc_account_id: new_strategy.heloc_account_id,
            rental_mortgage_account_id: new_strategy.rental_mortgage_account_id,
            simulation_months: new_strategy.simulation_months,
            rental_income: new_strategy.rental_income,
            rental_expenses: new_strategy.rental_expenses,
            effective_tax_rate: new_strategy.effective_tax_rate,
            total_interest_saved: None,
            total_tax_benefit: None,
            months_accelerated: None,
            status: StrategyStatus::Draft,
            last_simulated_at: None,
            created_at: now,
            updated_at: now,
        };
        self.repository.insert_strategy(strategy).await
    }

    fn get_strategy(&self, strategy_id: &str) -> Result<DebtOptimizationStrategy> {
        self.repository.get_strategy(strategy_id)
    }

    fn list_strategies(&self) -> Result<Vec<DebtOptimizationStrategy>> {
        self.repository.list_strategies()
    }

    async fn add_auto_stop_rule(&self, new_rule: NewAutoStopRule) -> Result<AutoStopRule> {
        let (rule_type, threshold_unit) = new_rule.validate()?;
        self.repository.get_strategy(&new_rule.strategy_id)?;
        let position = self.repository.list_rules(&new_rule.strategy_id)?.len();

        let rule = AutoStopRule {
            id: Uuid::new_v4().to_string(),
            strategy_id: new_rule.strategy_id,
            rule_type,
            threshold_value: new_rule.threshold_value,
            threshold_unit,
            enabled: new_rule.enabled,
            position: i32::try_from(position).unwrap_or(i32::MAX),
        };
        self.repository.insert_rule(rule).await
    }

    fn list_auto_stop_rules(&self, strategy_id: &str) -> Result<Vec<AutoStopRule>> {
        self.repository.list_rules(strategy_id)
    }

    fn list_ledger(&self, strategy_id: &str) -> Result<Vec<LedgerEntry>> {
        self.repository.list_ledger(strategy_id)
    }

    async fn simulate(&self, strategy_id: &str) -> Result<SimulationSummary> {
        let mut strategy = self.repository.get_strategy(strategy_id)?;
        let rules = self.repository.list_rules(strategy_id)?;

        let run = self.build_inputs(&strategy, rules).and_then(|inputs| {
            let outcome = self.simulator.run(&inputs)?;
            let baseline = self.simulator.run(&inputs.as_baseline())?;
            Ok((outcome, baseline))
        });
        let (outcome, baseline) = match run {
            Ok(runs) => runs,
            Err(e) => {
                error!("Simulation of strategy {} failed: {}", strategy_id, e);
                self.mark_failed(strategy).await?;
                return Err(e);
            }
        };

        let stopped_at = outcome.stopped_at;
        let written = self
            .repository
            .replace_ledger(strategy_id, outcome.entries)
            .await?;
        debug!(
            "Stored {} ledger entries for strategy {}",
            written, strategy_id
        );
        let totals = self.repository.ledger_totals(strategy_id)?;

        // Interest is compared over the months actually simulated
        let compared = totals.entry_count.min(baseline.entries.len());
        let baseline_window = LedgerTotals::from_entries(&baseline.entries[..compared]);
        let baseline_full = LedgerTotals::from_entries(&baseline.entries);

        let months_accelerated = match (baseline_full.payoff_month, totals.payoff_month) {
            (Some(base), Some(paid)) => i64::from(base) - i64::from(paid),
            (None, Some(paid)) => i64::from(strategy.simulation_months) - i64::from(paid),
            _ => 0,
        };
        let total_interest_saved = baseline_window.total_interest - totals.total_interest;

        let now = Utc::now().naive_utc();
        strategy.total_interest_saved = Some(total_interest_saved);
        strategy.total_tax_benefit = Some(totals.total_tax_benefit);
        strategy.months_accelerated = Some(months_accelerated);
        strategy.status = StrategyStatus::Simulated;
        strategy.last_simulated_at = Some(now);
        strategy.updated_at = now;
        let strategy = self.repository.update_strategy(strategy).await?;

        info!(
            "Simulated strategy {} ({}): {} months, interest saved {}",
            strategy.id, strategy.strategy_type, totals.entry_count, total_interest_saved
        );

        Ok(SimulationSummary {
            strategy_id: strategy.id,
            strategy_type: strategy.strategy_type,
            months_simulated: totals.entry_count,
            stopped_at,
            payoff_month: totals.payoff_month,
            baseline_payoff_month: baseline_full.payoff_month,
            total_interest: totals.total_interest,
            baseline_total_interest: baseline_window.total_interest,
            total_interest_saved,
            total_tax_benefit: totals.total_tax_benefit,
            months_accelerated,
        })
    }
}
