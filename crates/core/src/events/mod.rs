//! Business events that trigger ledger postings.
//!
//! Drafts compute every derived field (subtotals, totals, change) up front and
//! reject malformed input before any row is written.

pub mod deposit;
pub mod error;
pub mod sale;

pub use deposit::{DepositCategory, DepositDraft};
pub use error::EventError;
pub use sale::{PaymentMethod, SaleDraft, SaleItemDraft, SaleItemInput, aggregate_cost};
