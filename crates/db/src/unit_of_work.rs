//! Transaction scope for a single business operation.
//!
//! Every write path (sale, deposit, manual entry, reversal, member
//! registration) runs inside one [`UnitOfWork`]: the business record, its
//! sequence code, and its journal entry commit together or not at all.
//!
//! # Usage
//!
//! ```ignore
//! use koperasi_db::unit_of_work::UnitOfWork;
//!
//! let uow = UnitOfWork::begin(&db, &settings).await?;
//! let entry = engine.post_entry(uow.transaction(), tenant_id, actor_id, &draft).await?;
//! uow.commit().await?;
//! ```

use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::warn;

use koperasi_core::ledger::LedgerError;
use koperasi_shared::LedgerConfig;

/// A database transaction with the ledger's lock timeout applied.
///
/// Dropping a unit of work without committing rolls it back.
pub struct UnitOfWork {
    txn: DatabaseTransaction,
}

impl UnitOfWork {
    /// Begins a transaction and bounds how long it may wait on row locks.
    ///
    /// The timeout is set with `SET LOCAL`, which scopes it to this
    /// transaction only.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the lock
    /// timeout cannot be set.
    pub async fn begin(db: &DatabaseConnection, settings: &LedgerConfig) -> Result<Self, DbErr> {
        let txn = db.begin().await?;

        let sql = format!("SET LOCAL lock_timeout = '{}ms'", settings.lock_timeout_ms);
        txn.execute_unprepared(&sql).await?;

        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, persisting all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction, discarding all changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }

    /// Commits if `result` is `Ok`, otherwise rolls back and returns the error.
    ///
    /// A failed rollback is logged; the original error is still returned.
    ///
    /// # Errors
    ///
    /// Returns the error carried by `result`, or a database error if the
    /// commit fails.
    pub async fn complete<T, E>(self, result: Result<T, E>) -> Result<T, E>
    where
        E: From<LedgerError> + std::fmt::Display,
    {
        match result {
            Ok(value) => {
                self.commit().await.map_err(|err| {
                    E::from(LedgerError::Database {
                        step: "commit unit of work",
                        message: err.to_string(),
                    })
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(
                        error = %rollback_err,
                        cause = %err,
                        "Failed to roll back unit of work"
                    );
                }
                Err(err)
            }
        }
    }
}

/// Extension trait for `DatabaseConnection` to open a unit of work.
#[async_trait::async_trait]
pub trait UnitOfWorkExt {
    /// Begins a unit of work with the given ledger settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    async fn unit_of_work(&self, settings: &LedgerConfig) -> Result<UnitOfWork, DbErr>;
}

#[async_trait::async_trait]
impl UnitOfWorkExt for DatabaseConnection {
    async fn unit_of_work(&self, settings: &LedgerConfig) -> Result<UnitOfWork, DbErr> {
        UnitOfWork::begin(self, settings).await
    }
}
