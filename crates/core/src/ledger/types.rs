//! Domain types for journal creation.
//!
//! Derived fields (totals, balanced flag) are computed by constructors before
//! anything reaches the persistence layer.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use koperasi_shared::types::AccountId;

use super::balance::NormalSide;
use super::validation::{BALANCE_TOLERANCE, LedgerValidationError, validate_lines};

/// Account classification in the chart of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Resources owned by the cooperative.
    Asset,
    /// Obligations to third parties.
    Liability,
    /// Member capital and retained surplus.
    Equity,
    /// Income from sales and services.
    Revenue,
    /// Costs of operation, including cost of goods sold.
    Expense,
}

impl AccountType {
    /// Returns the normal balance side implied by this type.
    ///
    /// Asset/Expense are debit-normal; Liability/Equity/Revenue are credit-normal.
    #[must_use]
    pub const fn default_normal_side(self) -> NormalSide {
        match self {
            Self::Asset | Self::Expense => NormalSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => NormalSide::Credit,
        }
    }

    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Category tag recorded on a journal header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalCategory {
    /// Posted from a point-of-sale sale.
    Sale,
    /// Posted from a member capital deposit.
    Deposit,
    /// Entered by hand.
    Manual,
    /// Mirror image of an earlier entry.
    Reversal,
}

impl JournalCategory {
    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Deposit => "deposit",
            Self::Manual => "manual",
            Self::Reversal => "reversal",
        }
    }
}

impl fmt::Display for JournalCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "deposit" => Ok(Self::Deposit),
            "manual" => Ok(Self::Manual),
            "reversal" => Ok(Self::Reversal),
            other => Err(format!("unknown journal category: {other}")),
        }
    }
}

/// A proposed debit-or-credit line against one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Account the line posts to.
    pub account_id: AccountId,
    /// Debit amount (zero on a credit line).
    pub debit: Decimal,
    /// Credit amount (zero on a debit line).
    pub credit: Decimal,
    /// Free-text line note.
    pub note: Option<String>,
}

impl JournalLine {
    /// Creates a debit-only line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal, note: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: amount,
            credit: Decimal::ZERO,
            note: Some(note.into()),
        }
    }

    /// Creates a credit-only line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal, note: impl Into<String>) -> Self {
        Self {
            account_id,
            debit: Decimal::ZERO,
            credit: amount,
            note: Some(note.into()),
        }
    }
}

/// Summed sides of a line set plus the derived balanced flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalTotals {
    /// Sum of all debits.
    pub total_debit: Decimal,
    /// Sum of all credits.
    pub total_credit: Decimal,
    /// Sides agree within tolerance and carry value above it.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Sums the lines and derives the balanced flag.
    #[must_use]
    pub fn from_lines(lines: &[JournalLine]) -> Self {
        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();
        let is_balanced = (total_debit - total_credit).abs() <= BALANCE_TOLERANCE
            && total_debit > BALANCE_TOLERANCE;

        Self {
            total_debit,
            total_credit,
            is_balanced,
        }
    }
}

/// A validated journal entry ready to be numbered and persisted.
///
/// Only obtainable through [`JournalDraft::new`], so holding one proves the
/// lines passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalDraft {
    date: NaiveDate,
    description: String,
    reference: Option<String>,
    category: JournalCategory,
    lines: Vec<JournalLine>,
    totals: JournalTotals,
}

impl JournalDraft {
    /// Validates the lines and computes totals.
    ///
    /// # Errors
    ///
    /// Returns the first double-entry rule the lines violate.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        reference: Option<String>,
        category: JournalCategory,
        lines: Vec<JournalLine>,
    ) -> Result<Self, LedgerValidationError> {
        validate_lines(&lines)?;
        let totals = JournalTotals::from_lines(&lines);

        Ok(Self {
            date,
            description: description.into(),
            reference,
            category,
            lines,
            totals,
        })
    }

    /// Entry date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Header description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// External reference, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Category tag.
    #[must_use]
    pub const fn category(&self) -> JournalCategory {
        self.category
    }

    /// Validated lines.
    #[must_use]
    pub fn lines(&self) -> &[JournalLine] {
        &self.lines
    }

    /// Precomputed totals.
    #[must_use]
    pub const fn totals(&self) -> JournalTotals {
        self.totals
    }
}
