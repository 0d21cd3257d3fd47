//! Double-entry rule validation for proposed journal lines.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::types::JournalLine;

/// Largest difference between the debit and credit sums still treated as balanced.
///
/// Amounts are currency values with two decimal places.
pub const BALANCE_TOLERANCE: Decimal = dec!(0.01);

/// Decimal places a money amount may carry; matches the `NUMERIC(18,2)` columns.
pub const MONEY_SCALE: u32 = 2;

/// Whether `amount` fits in [`MONEY_SCALE`] decimal places without rounding.
///
/// Trailing zeros do not count, so `1.500` is accepted and `1.005` is not.
#[must_use]
pub fn fits_money_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= MONEY_SCALE
}

/// Validation errors for a proposed line set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerValidationError {
    /// Fewer than two lines.
    #[error("Journal entry must have at least 2 lines, got {count}")]
    TooFewLines {
        /// Number of lines supplied.
        count: usize,
    },

    /// A line carries a negative amount.
    #[error("Line {line} has a negative amount")]
    NegativeAmount {
        /// Zero-based line index.
        line: usize,
    },

    /// A line amount has more decimal places than the money columns store.
    #[error("Line {line} has more than 2 decimal places")]
    ExcessPrecision {
        /// Zero-based line index.
        line: usize,
    },

    /// A line has both a debit and a credit.
    #[error("Line {line} has both debit and credit")]
    MixedSides {
        /// Zero-based line index.
        line: usize,
    },

    /// A line has neither a debit nor a credit.
    #[error("Line {line} has neither debit nor credit")]
    EmptyLine {
        /// Zero-based line index.
        line: usize,
    },

    /// All lines sit on the same side.
    #[error("Journal entry must have at least one debit line and one credit line")]
    OneSidedEntry,

    /// Sides differ by more than the tolerance.
    #[error("Journal entry is unbalanced: debits ({debits}) != credits ({credits})")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    /// The entry carries no economic value.
    #[error("Journal entry total ({total}) must exceed 0.01")]
    ZeroValue {
        /// Total debit amount.
        total: Decimal,
    },
}

/// Validates a proposed set of journal lines.
///
/// Rules are checked in order: line count, then each line, then sides,
/// then balance, then value.
///
/// # Errors
///
/// Returns the first rule the lines violate.
pub fn validate_lines(lines: &[JournalLine]) -> Result<(), LedgerValidationError> {
    if lines.len() < 2 {
        return Err(LedgerValidationError::TooFewLines { count: lines.len() });
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for (index, line) in lines.iter().enumerate() {
        if line.debit.is_sign_negative() || line.credit.is_sign_negative() {
            return Err(LedgerValidationError::NegativeAmount { line: index });
        }

        if !fits_money_scale(line.debit) || !fits_money_scale(line.credit) {
            return Err(LedgerValidationError::ExcessPrecision { line: index });
        }

        let is_debit = line.debit > Decimal::ZERO;
        let is_credit = line.credit > Decimal::ZERO;

        match (is_debit, is_credit) {
            (true, true) => return Err(LedgerValidationError::MixedSides { line: index }),
            (false, false) => return Err(LedgerValidationError::EmptyLine { line: index }),
            (true, false) => has_debit = true,
            (false, true) => has_credit = true,
        }

        total_debits += line.debit;
        total_credits += line.credit;
    }

    if !has_debit || !has_credit {
        return Err(LedgerValidationError::OneSidedEntry);
    }

    if (total_debits - total_credits).abs() > BALANCE_TOLERANCE {
        return Err(LedgerValidationError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    if total_debits <= BALANCE_TOLERANCE {
        return Err(LedgerValidationError::ZeroValue {
            total: total_debits,
        });
    }

    Ok(())
}
