//! Member capital deposits.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::EventError;
use crate::ledger::{codes, fits_money_scale};

/// Kind of member capital a deposit adds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositCategory {
    /// One-time joining capital.
    Principal,
    /// Periodic required capital.
    Mandatory,
    /// Optional savings.
    Voluntary,
}

impl DepositCategory {
    /// Chart-of-accounts code of the capital account credited by this category.
    #[must_use]
    pub const fn capital_account_code(self) -> &'static str {
        match self {
            Self::Principal => codes::PRINCIPAL_SAVINGS,
            Self::Mandatory => codes::MANDATORY_SAVINGS,
            Self::Voluntary => codes::VOLUNTARY_SAVINGS,
        }
    }

    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Principal => "principal",
            Self::Mandatory => "mandatory",
            Self::Voluntary => "voluntary",
        }
    }

    /// Capitalised label used in journal descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Principal => "Principal",
            Self::Mandatory => "Mandatory",
            Self::Voluntary => "Voluntary",
        }
    }
}

impl fmt::Display for DepositCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepositCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "principal" => Ok(Self::Principal),
            "mandatory" => Ok(Self::Mandatory),
            "voluntary" => Ok(Self::Voluntary),
            other => Err(format!("unknown deposit category: {other}")),
        }
    }
}

/// A validated deposit amount and category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositDraft {
    category: DepositCategory,
    amount: Decimal,
}

impl DepositDraft {
    /// Validates the amount.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidAmount`] unless `amount` is positive, or
    /// [`EventError::ExcessPrecision`] when it is finer than a cent.
    pub fn new(category: DepositCategory, amount: Decimal) -> Result<Self, EventError> {
        if amount <= Decimal::ZERO {
            return Err(EventError::InvalidAmount);
        }
        if !fits_money_scale(amount) {
            return Err(EventError::ExcessPrecision {
                field: "Deposit amount",
                value: amount,
            });
        }
        Ok(Self { category, amount })
    }

    /// Deposit category.
    #[must_use]
    pub const fn category(&self) -> DepositCategory {
        self.category
    }

    /// Deposited amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_capital_account_codes() {
        assert_eq!(DepositCategory::Principal.capital_account_code(), "3101");
        assert_eq!(DepositCategory::Mandatory.capital_account_code(), "3102");
        assert_eq!(DepositCategory::Voluntary.capital_account_code(), "3103");
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(DepositDraft::new(DepositCategory::Principal, dec!(100000)).is_ok());
        assert!(matches!(
            DepositDraft::new(DepositCategory::Mandatory, Decimal::ZERO),
            Err(EventError::InvalidAmount)
        ));
        assert!(matches!(
            DepositDraft::new(DepositCategory::Voluntary, dec!(-1)),
            Err(EventError::InvalidAmount)
        ));
    }

    #[test]
    fn test_sub_cent_amount_rejected() {
        assert!(matches!(
            DepositDraft::new(DepositCategory::Voluntary, dec!(1.001)),
            Err(EventError::ExcessPrecision { field: "Deposit amount", value }) if value == dec!(1.001)
        ));
        let draft = DepositDraft::new(DepositCategory::Voluntary, dec!(1.50)).unwrap();
        assert_eq!(draft.amount(), dec!(1.50));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "Voluntary".parse::<DepositCategory>().unwrap(),
            DepositCategory::Voluntary
        );
        assert!("sukarela".parse::<DepositCategory>().is_err());
    }
}
