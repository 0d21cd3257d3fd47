//! Account balance calculations.
//!
//! - Debit-normal accounts (Asset, Expense): balance = debits - credits
//! - Credit-normal accounts (Liability, Equity, Revenue): balance = credits - debits

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use koperasi_shared::types::AccountId;

/// Side on which an account's balance naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalSide {
    /// Debits increase the balance.
    Debit,
    /// Credits increase the balance.
    Credit,
}

impl NormalSide {
    /// Calculates the balance change for a single debit/credit pair.
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self {
            Self::Debit => debit - credit,
            Self::Credit => credit - debit,
        }
    }

    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for NormalSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormalSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(format!("unknown normal side: {other}")),
        }
    }
}

/// Account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Normal balance side of the account.
    pub normal_side: NormalSide,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
}

impl AccountBalance {
    /// Creates an empty balance.
    #[must_use]
    pub const fn new(account_id: AccountId, normal_side: NormalSide) -> Self {
        Self {
            account_id,
            normal_side,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
        }
    }

    /// Adds one line's amounts.
    pub fn add_line(&mut self, debit: Decimal, credit: Decimal) {
        self.debit_total += debit;
        self.credit_total += credit;
    }

    /// Net balance signed by the normal side.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.normal_side
            .balance_change(self.debit_total, self.credit_total)
    }
}

/// One journal line as read for a ledger listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLine {
    /// Journal entry date.
    pub date: NaiveDate,
    /// Journal number of the owning entry.
    pub journal_number: String,
    /// Description of the owning entry.
    pub description: String,
    /// Line note.
    pub note: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// A ledger listing row with the balance after the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Journal entry date.
    pub date: NaiveDate,
    /// Journal number of the owning entry.
    pub journal_number: String,
    /// Description of the owning entry.
    pub description: String,
    /// Line note.
    pub note: Option<String>,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after applying this line.
    pub running_balance: Decimal,
}

/// Builds a running ledger starting from `opening`.
///
/// Lines are ordered by date, then journal number. Numbers compare by length
/// first so a sequence past `9999` sorts after it. Ties keep input order.
#[must_use]
pub fn running_ledger(
    normal_side: NormalSide,
    opening: Decimal,
    lines: impl IntoIterator<Item = LedgerLine>,
) -> Vec<LedgerRow> {
    let mut lines: Vec<LedgerLine> = lines.into_iter().collect();
    lines.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.journal_number.len().cmp(&b.journal_number.len()))
            .then_with(|| a.journal_number.cmp(&b.journal_number))
    });

    let mut balance = opening;
    lines
        .into_iter()
        .map(|line| {
            balance += normal_side.balance_change(line.debit, line.credit);
            LedgerRow {
                date: line.date,
                journal_number: line.journal_number,
                description: line.description,
                note: line.note,
                debit: line.debit,
                credit: line.credit,
                running_balance: balance,
            }
        })
        .collect()
}
