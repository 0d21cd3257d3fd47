//! Errors raised by sale and deposit handlers.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use koperasi_shared::AppError;

use crate::ledger::LedgerError;

/// Errors that can occur while recording a business event.
#[derive(Debug, Error)]
pub enum EventError {
    /// A sale must contain at least one item.
    #[error("Sale must contain at least one item")]
    EmptySale,

    /// Item quantity must be positive.
    #[error("Quantity for product {product_id} must be positive, got {quantity}")]
    InvalidQuantity {
        /// Product on the offending item.
        product_id: Uuid,
        /// Supplied quantity.
        quantity: i32,
    },

    /// Item unit price must be positive.
    #[error("Unit price for product {product_id} must be positive")]
    InvalidUnitPrice {
        /// Product on the offending item.
        product_id: Uuid,
    },

    /// Amount paid does not cover the sale total.
    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment {
        /// Sale total.
        total: Decimal,
        /// Amount tendered.
        paid: Decimal,
    },

    /// A money amount has more than two decimal places.
    #[error("{field} {value} has more than 2 decimal places")]
    ExcessPrecision {
        /// Which input carried the amount.
        field: &'static str,
        /// Supplied amount.
        value: Decimal,
    },

    /// Deposit amount must be positive.
    #[error("Deposit amount must be positive")]
    InvalidAmount,

    /// Not enough stock for the requested quantity.
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        /// Product being sold.
        product_id: Uuid,
        /// Stock on hand.
        available: i32,
        /// Quantity requested.
        requested: i32,
    },

    /// Product does not exist in this tenant.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Member does not exist in this tenant.
    #[error("Member not found: {0}")]
    MemberNotFound(Uuid),

    /// Member is not active.
    #[error("Member {0} is not active")]
    MemberInactive(Uuid),

    /// Numbering or posting failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl EventError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptySale => "EMPTY_SALE",
            Self::InvalidQuantity { .. } => "INVALID_QUANTITY",
            Self::InvalidUnitPrice { .. } => "INVALID_UNIT_PRICE",
            Self::InsufficientPayment { .. } => "INSUFFICIENT_PAYMENT",
            Self::ExcessPrecision { .. } => "EXCESS_PRECISION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            Self::MemberNotFound(_) => "MEMBER_NOT_FOUND",
            Self::MemberInactive(_) => "MEMBER_INACTIVE",
            Self::Ledger(inner) => inner.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptySale
            | Self::InvalidQuantity { .. }
            | Self::InvalidUnitPrice { .. }
            | Self::InsufficientPayment { .. }
            | Self::ExcessPrecision { .. }
            | Self::InvalidAmount
            | Self::MemberInactive(_) => 400,
            Self::ProductNotFound(_) | Self::MemberNotFound(_) => 404,
            Self::InsufficientStock { .. } => 409,
            Self::Ledger(inner) => inner.http_status_code(),
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Ledger(inner) => inner.into(),
            EventError::ProductNotFound(_) | EventError::MemberNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            EventError::InsufficientStock { .. } => Self::Conflict(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
