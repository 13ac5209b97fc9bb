//! Loans module - amortization arithmetic shared by milestones and the debt simulator.

mod loan_payoff_calculator;

pub use loan_payoff_calculator::{
    monthly_interest, monthly_payment, AmortizationRow, LoanPayoffCalculator,
};
