/// Default account type for new accounts
pub const DEFAULT_ACCOUNT_TYPE: &str = "SECURITIES";

/// Account type constants
pub mod account_types {
    pub const SECURITIES: &str = "SECURITIES";
    pub const CASH: &str = "CASH";
    pub const PROPERTY: &str = "PROPERTY";
    pub const MORTGAGE: &str = "MORTGAGE";
    pub const HELOC: &str = "HELOC";
    pub const LOAN: &str = "LOAN";
    pub const CREDIT_CARD: &str = "CREDIT_CARD";
    pub const LIABILITY: &str = "LIABILITY";
    pub const OTHER: &str = "OTHER";
}

/// Returns true if the given account type is valid.
pub fn is_valid_account_type(account_type: &str) -> bool {
    matches!(
        account_type,
        account_types::SECURITIES
            | account_types::CASH
            | account_types::PROPERTY
            | account_types::MORTGAGE
            | account_types::HELOC
            | account_types::LOAN
            | account_types::CREDIT_CARD
            | account_types::LIABILITY
            | account_types::OTHER
    )
}

/// Returns true if the account type is a liability.
pub fn is_liability_type(account_type: &str) -> bool {
    matches!(
        account_type,
        account_types::MORTGAGE
            | account_types::HELOC
            | account_types::LOAN
            | account_types::CREDIT_CARD
            | account_types::LIABILITY
    )
}

/// Returns true if the account type is an amortizing loan.
pub fn is_amortizing_loan_type(account_type: &str) -> bool {
    matches!(account_type, account_types::MORTGAGE | account_types::LOAN)
}
