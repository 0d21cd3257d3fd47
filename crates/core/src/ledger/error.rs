//! Ledger error taxonomy.
//!
//! Every error raised while numbering or posting a journal entry lands in
//! [`LedgerError`]. Variants carry enough context (step, scope, account code)
//! to diagnose a rolled-back posting without re-running it.

use thiserror::Error;
use uuid::Uuid;

use koperasi_shared::AppError;

use super::validation::LedgerValidationError;
use crate::sequence::SequenceScope;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The caller's line set breaks a double-entry rule.
    #[error("Invalid journal entry: {0}")]
    Validation(#[from] LedgerValidationError),

    /// A referenced record does not exist in this tenant.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record.
        entity: &'static str,
        /// Identifier that was looked up.
        id: Uuid,
    },

    /// The next sequence code could not be computed.
    #[error("Failed to generate {scope} code: {reason}")]
    GenerationFailed {
        /// Counter family.
        scope: SequenceScope,
        /// Underlying cause.
        reason: String,
    },

    /// A generated code collided with a concurrently committed one.
    #[error("{scope} code {code} was taken by a concurrent transaction")]
    UniquenessRace {
        /// Counter family.
        scope: SequenceScope,
        /// The colliding code.
        code: String,
    },

    /// Lines assembled by the posting engine failed validation.
    #[error("Posting invariant violated while posting {event}: {source}")]
    PostingInvariantViolation {
        /// Business event being posted.
        event: &'static str,
        /// The rule the generated lines broke.
        #[source]
        source: LedgerValidationError,
    },

    /// A well-known account is missing from the tenant's chart.
    #[error("Required account {code} is missing from the chart of accounts")]
    AccountNotFound {
        /// Account code that was looked up.
        code: String,
    },

    /// Database failure during a named step.
    #[error("Database error during {step}: {message}")]
    Database {
        /// Step that failed.
        step: &'static str,
        /// Underlying database message.
        message: String,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::GenerationFailed { .. } => "GENERATION_FAILED",
            Self::UniquenessRace { .. } => "UNIQUENESS_RACE",
            Self::PostingInvariantViolation { .. } => "POSTING_INVARIANT_VIOLATION",
            Self::AccountNotFound { .. } => "ACCOUNT_NOT_FOUND",
            Self::Database { .. } => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller input
            Self::Validation(_) => 400,

            // 404 Not Found
            Self::NotFound { .. } => 404,

            // 409 Conflict - concurrency
            Self::UniquenessRace { .. } => 409,

            // 422 Unprocessable - tenant misconfiguration
            Self::AccountNotFound { .. } => 422,

            // 503 Service Unavailable - transient
            Self::GenerationFailed { .. } => 503,

            // 500 Internal Server Error
            Self::PostingInvariantViolation { .. } | Self::Database { .. } => 500,
        }
    }

    /// Returns true if repeating the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed { .. } | Self::UniquenessRace { .. }
        )
    }

    /// Returns true if the error signals a defect rather than bad input.
    #[must_use]
    pub const fn is_defect(&self) -> bool {
        matches!(self, Self::PostingInvariantViolation { .. })
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::Validation(_) => Self::Validation(message),
            LedgerError::NotFound { .. } => Self::NotFound(message),
            LedgerError::UniquenessRace { .. } => Self::Conflict(message),
            LedgerError::AccountNotFound { .. } => Self::BusinessRule(message),
            LedgerError::Database { .. } => Self::Database(message),
            LedgerError::GenerationFailed { .. } | LedgerError::PostingInvariantViolation { .. } => {
                Self::Internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn race() -> LedgerError {
        LedgerError::UniquenessRace {
            scope: SequenceScope::Journal,
            code: "JRN-20250116-0001".to_string(),
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::from(LedgerValidationError::OneSidedEntry).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(race().error_code(), "UNIQUENESS_RACE");
        assert_eq!(
            LedgerError::AccountNotFound {
                code: "1101".to_string()
            }
            .error_code(),
            "ACCOUNT_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(
            LedgerError::from(LedgerValidationError::TooFewLines { count: 1 }).http_status_code(),
            400
        );
        assert_eq!(
            LedgerError::NotFound {
                entity: "sale",
                id: Uuid::nil()
            }
            .http_status_code(),
            404
        );
        assert_eq!(race().http_status_code(), 409);
        assert_eq!(
            LedgerError::Database {
                step: "insert journal header",
                message: "boom".to_string()
            }
            .http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(race().is_retryable());
        assert!(
            LedgerError::GenerationFailed {
                scope: SequenceScope::Sale,
                reason: "lock timeout".to_string()
            }
            .is_retryable()
        );
        assert!(
            !LedgerError::AccountNotFound {
                code: "5201".to_string()
            }
            .is_retryable()
        );
        assert!(!LedgerError::from(LedgerValidationError::OneSidedEntry).is_retryable());
    }

    #[test]
    fn test_invariant_violation_is_a_defect() {
        let err = LedgerError::PostingInvariantViolation {
            event: "sale",
            source: LedgerValidationError::Unbalanced {
                debits: dec!(10),
                credits: dec!(9),
            },
        };
        assert!(err.is_defect());
        assert!(!err.is_retryable());
        assert_eq!(
            err.to_string(),
            "Posting invariant violated while posting sale: Journal entry is unbalanced: debits (10) != credits (9)"
        );
    }

    #[test]
    fn test_into_app_error() {
        let err = AppError::from(LedgerError::AccountNotFound {
            code: "1101".to_string(),
        });
        assert_eq!(err.error_code(), "BUSINESS_RULE_VIOLATION");
        assert_eq!(AppError::from(race()).status_code(), 409);
        assert_eq!(
            AppError::from(LedgerError::from(LedgerValidationError::OneSidedEntry)).status_code(),
            400
        );
    }

    #[test]
    fn test_error_display_carries_context() {
        assert_eq!(
            LedgerError::AccountNotFound {
                code: "3102".to_string()
            }
            .to_string(),
            "Required account 3102 is missing from the chart of accounts"
        );
        assert_eq!(
            race().to_string(),
            "journal code JRN-20250116-0001 was taken by a concurrent transaction"
        );
    }
}
