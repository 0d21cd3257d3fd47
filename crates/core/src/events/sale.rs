//! Point-of-sale sale drafts.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use koperasi_shared::types::ProductId;

use super::error::EventError;
use crate::ledger::fits_money_scale;

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash at the till.
    #[default]
    Cash,
}

impl PaymentMethod {
    /// Returns the lowercase storage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requested line on a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItemInput {
    /// Product being sold.
    pub product_id: ProductId,
    /// Units sold.
    pub quantity: i32,
    /// Selling price per unit.
    pub unit_price: Decimal,
}

/// A sale line with its subtotal computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleItemDraft {
    /// Product being sold.
    pub product_id: ProductId,
    /// Units sold.
    pub quantity: i32,
    /// Selling price per unit.
    pub unit_price: Decimal,
    /// `quantity * unit_price`.
    pub subtotal: Decimal,
}

/// A validated sale with totals and change computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleDraft {
    items: Vec<SaleItemDraft>,
    total: Decimal,
    amount_paid: Decimal,
    change: Decimal,
}

impl SaleDraft {
    /// Computes subtotals, total, and change.
    ///
    /// # Errors
    ///
    /// Returns an error when there are no items, an item has a non-positive
    /// quantity or price, a price or the payment is finer than a cent, or the
    /// payment does not cover the total.
    pub fn new(items: Vec<SaleItemInput>, amount_paid: Decimal) -> Result<Self, EventError> {
        if items.is_empty() {
            return Err(EventError::EmptySale);
        }
        if !fits_money_scale(amount_paid) {
            return Err(EventError::ExcessPrecision {
                field: "Amount paid",
                value: amount_paid,
            });
        }

        let mut drafts = Vec::with_capacity(items.len());
        for item in items {
            if item.quantity <= 0 {
                return Err(EventError::InvalidQuantity {
                    product_id: item.product_id.into_inner(),
                    quantity: item.quantity,
                });
            }
            if item.unit_price <= Decimal::ZERO {
                return Err(EventError::InvalidUnitPrice {
                    product_id: item.product_id.into_inner(),
                });
            }
            if !fits_money_scale(item.unit_price) {
                return Err(EventError::ExcessPrecision {
                    field: "Unit price",
                    value: item.unit_price,
                });
            }

            drafts.push(SaleItemDraft {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_price: item.unit_price,
                subtotal: item.unit_price * Decimal::from(item.quantity),
            });
        }

        let total: Decimal = drafts.iter().map(|d| d.subtotal).sum();
        if amount_paid < total {
            return Err(EventError::InsufficientPayment {
                total,
                paid: amount_paid,
            });
        }

        Ok(Self {
            items: drafts,
            total,
            amount_paid,
            change: amount_paid - total,
        })
    }

    /// Sale lines.
    #[must_use]
    pub fn items(&self) -> &[SaleItemDraft] {
        &self.items
    }

    /// Sum of subtotals.
    #[must_use]
    pub const fn total(&self) -> Decimal {
        self.total
    }

    /// Amount tendered.
    #[must_use]
    pub const fn amount_paid(&self) -> Decimal {
        self.amount_paid
    }

    /// `amount_paid - total`, never negative.
    #[must_use]
    pub const fn change(&self) -> Decimal {
        self.change
    }
}

/// Aggregate cost of goods sold for `(quantity, unit_cost)` pairs.
///
/// Items without a known unit cost contribute nothing.
#[must_use]
pub fn aggregate_cost(items: impl IntoIterator<Item = (i32, Option<Decimal>)>) -> Decimal {
    items
        .into_iter()
        .filter_map(|(quantity, unit_cost)| unit_cost.map(|c| c * Decimal::from(quantity)))
        .sum()
}
