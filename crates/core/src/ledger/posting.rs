//! Journal line builders for business events.
//!
//! These functions only describe the economic effect of an event. Resolving
//! account codes and persisting the result belongs to the database layer.

use rust_decimal::Decimal;

use koperasi_shared::types::AccountId;

use super::types::JournalLine;
use crate::events::DepositCategory;

/// Well-known chart-of-accounts codes consumed by posting.
pub mod codes {
    /// Cash on hand.
    pub const CASH: &str = "1101";
    /// Merchandise inventory.
    pub const INVENTORY: &str = "1301";
    /// Principal member savings.
    pub const PRINCIPAL_SAVINGS: &str = "3101";
    /// Mandatory member savings.
    pub const MANDATORY_SAVINGS: &str = "3102";
    /// Voluntary member savings.
    pub const VOLUNTARY_SAVINGS: &str = "3103";
    /// Sales revenue.
    pub const SALES_REVENUE: &str = "4101";
    /// Cost of goods sold.
    pub const COST_OF_GOODS_SOLD: &str = "5201";
}

/// Accounts a sale posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalePostingAccounts {
    /// Debited for the sale total.
    pub cash: AccountId,
    /// Credited for the sale total.
    pub revenue: AccountId,
    /// Debited for the cost of items sold.
    pub cost_of_goods: AccountId,
    /// Credited for the cost of items sold.
    pub inventory: AccountId,
}

/// Debit cash / credit revenue for `total`, plus debit COGS / credit
/// inventory for `cost` when it is positive.
#[must_use]
pub fn sale_lines(accounts: &SalePostingAccounts, total: Decimal, cost: Decimal) -> Vec<JournalLine> {
    let mut lines = vec![
        JournalLine::debit(accounts.cash, total, "Cash received from sale"),
        JournalLine::credit(accounts.revenue, total, "Sales revenue"),
    ];

    if cost > Decimal::ZERO {
        lines.push(JournalLine::debit(
            accounts.cost_of_goods,
            cost,
            "Cost of goods sold",
        ));
        lines.push(JournalLine::credit(
            accounts.inventory,
            cost,
            "Inventory reduction",
        ));
    }

    lines
}

/// Debit cash / credit the capital account, both for `amount`.
#[must_use]
pub fn deposit_lines(
    cash: AccountId,
    capital: AccountId,
    category: DepositCategory,
    amount: Decimal,
) -> Vec<JournalLine> {
    let note = deposit_description(category);
    vec![
        JournalLine::debit(cash, amount, note.clone()),
        JournalLine::credit(capital, amount, note),
    ]
}

/// Mirror image of `lines`: every debit becomes a credit and vice versa.
#[must_use]
pub fn reversal_lines(lines: &[JournalLine]) -> Vec<JournalLine> {
    lines
        .iter()
        .map(|line| JournalLine {
            account_id: line.account_id,
            debit: line.credit,
            credit: line.debit,
            note: Some(format!(
                "Reversal: {}",
                line.note.as_deref().unwrap_or_default()
            )),
        })
        .collect()
}

/// Header description for a sale posting.
#[must_use]
pub fn sale_description(sale_number: &str) -> String {
    format!("Sale {sale_number}")
}

/// Header description and line note for a deposit posting.
#[must_use]
pub fn deposit_description(category: DepositCategory) -> String {
    format!("{} deposit", category.label())
}

/// Header description for a reversal.
#[must_use]
pub fn reversal_description(original: &str, note: Option<&str>) -> String {
    match note.filter(|n| !n.trim().is_empty()) {
        Some(note) => format!("REVERSAL: {original} - {note}"),
        None => format!("REVERSAL: {original}"),
    }
}

/// Reference recorded on a reversal entry.
#[must_use]
pub fn reversal_reference(original_journal_number: &str) -> String {
    format!("REV-{original_journal_number}")
}
