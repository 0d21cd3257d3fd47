//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journal line validation against double-entry rules
//! - Balance calculations by normal balance side
//! - Journal line builders for sales, deposits, and reversals
//! - Error taxonomy for posting operations

pub mod balance;
pub mod error;
pub mod posting;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod validation_props;

pub use balance::{AccountBalance, LedgerLine, LedgerRow, NormalSide, running_ledger};
pub use error::LedgerError;
pub use posting::{SalePostingAccounts, codes};
pub use types::{AccountType, JournalCategory, JournalDraft, JournalLine, JournalTotals};
pub use validation::{
    BALANCE_TOLERANCE, LedgerValidationError, MONEY_SCALE, fits_money_scale, validate_lines,
};
