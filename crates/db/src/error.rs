//! Mapping of `SeaORM` errors into ledger errors.

use sea_orm::{DbErr, RuntimeErr};

use koperasi_core::ledger::LedgerError;

/// `PostgreSQL` SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Attaches the failing step to a database error.
pub(crate) trait DbResultExt<T> {
    /// Maps `DbErr` into [`LedgerError::Database`] tagged with `step`.
    fn step(self, step: &'static str) -> Result<T, LedgerError>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn step(self, step: &'static str) -> Result<T, LedgerError> {
        self.map_err(|err| LedgerError::Database {
            step,
            message: err.to_string(),
        })
    }
}

/// Returns true if `err` is a unique violation on the named constraint.
pub(crate) fn is_unique_violation(err: &DbErr, constraint: &str) -> bool {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) => runtime,
        _ => return false,
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_tags_database_errors() {
        let result: Result<(), DbErr> = Err(DbErr::Custom("connection reset".to_string()));
        let err = result.step("insert journal lines").unwrap_err();

        assert!(matches!(
            err,
            LedgerError::Database { step: "insert journal lines", ref message }
                if message.contains("connection reset")
        ));
    }

    #[test]
    fn test_non_driver_errors_are_not_unique_violations() {
        assert!(!is_unique_violation(
            &DbErr::Custom("duplicate".to_string()),
            "uq_journal_entries_number"
        ));
        assert!(!is_unique_violation(
            &DbErr::RecordNotInserted,
            "uq_journal_entries_number"
        ));
    }
}
