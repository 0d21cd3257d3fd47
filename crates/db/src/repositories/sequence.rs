//! Persistent sequence generator.
//!
//! Issues the next `PREFIX-BUCKET-NNNN` code for a tenant by locking the
//! newest code already stored in the owning table. Two transactions asking
//! for the same `(tenant, scope, bucket)` are serialized on a
//! transaction-scoped advisory lock, so the second one reads the first one's
//! committed code. A unique violation on insert is still handled: the insert
//! runs in a savepoint and the code is regenerated a bounded number of times.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, DatabaseTransaction, DbBackend,
    DbErr, EntityTrait, IntoActiveModel, Statement, TransactionTrait,
};
use tracing::{debug, warn};
use uuid::Uuid;

use koperasi_core::ledger::LedgerError;
use koperasi_core::sequence::SequenceScope;

use crate::error::{DbResultExt, is_unique_violation};

/// Where a scope's codes are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SequenceTarget {
    table: &'static str,
    column: &'static str,
    constraint: &'static str,
}

impl SequenceTarget {
    const fn of(scope: SequenceScope) -> Self {
        match scope {
            SequenceScope::Journal => Self {
                table: "journal_entries",
                column: "journal_number",
                constraint: "uq_journal_entries_number",
            },
            SequenceScope::Sale => Self {
                table: "sales",
                column: "sale_number",
                constraint: "uq_sales_number",
            },
            SequenceScope::Deposit => Self {
                table: "deposits",
                column: "reference_number",
                constraint: "uq_deposits_reference",
            },
            SequenceScope::Member => Self {
                table: "members",
                column: "member_number",
                constraint: "uq_members_number",
            },
        }
    }

    /// Newest code with the given prefix, locked for the rest of the transaction.
    ///
    /// Soft-deleted rows are included so their codes are never reissued.
    /// Ordering by length first keeps ordinals past 9999 ahead of `...-9999`.
    fn last_code_sql(self) -> String {
        format!(
            "SELECT {column} AS code FROM {table} \
             WHERE tenant_id = $1 AND {column} LIKE $2 \
             ORDER BY length({column}) DESC, {column} DESC \
             LIMIT 1 FOR UPDATE",
            column = self.column,
            table = self.table,
        )
    }
}

const BUCKET_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

/// Generates unique, tenant-scoped, human-readable codes.
#[derive(Debug, Clone, Copy)]
pub struct SequenceGenerator {
    retry_attempts: u32,
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl SequenceGenerator {
    /// Creates a generator that regenerates a colliding code up to
    /// `retry_attempts` times before giving up.
    #[must_use]
    pub const fn new(retry_attempts: u32) -> Self {
        Self { retry_attempts }
    }

    /// Returns the next code for `scope` in the bucket containing `date`.
    ///
    /// Must run inside the transaction that inserts the code; the locks it
    /// takes are held until that transaction ends.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::GenerationFailed`] if the lock or lookup fails,
    /// including on lock timeout.
    pub async fn next_code<C>(
        &self,
        conn: &C,
        tenant_id: Uuid,
        scope: SequenceScope,
        date: NaiveDate,
    ) -> Result<String, LedgerError>
    where
        C: ConnectionTrait,
    {
        let target = SequenceTarget::of(scope);
        let prefix = scope.code_prefix(date);
        let generation_failed = |err: DbErr| LedgerError::GenerationFailed {
            scope,
            reason: err.to_string(),
        };

        conn.execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            BUCKET_LOCK_SQL,
            [format!("{tenant_id}:{prefix}").into()],
        ))
        .await
        .map_err(generation_failed)?;

        let row = conn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                target.last_code_sql(),
                [tenant_id.into(), format!("{prefix}%").into()],
            ))
            .await
            .map_err(generation_failed)?;

        let last = row
            .map(|r| r.try_get::<String>("", "code"))
            .transpose()
            .map_err(generation_failed)?;

        let code = scope.next_code(last.as_deref(), date);
        debug!(
            tenant_id = %tenant_id,
            scope = %scope,
            last = last.as_deref().unwrap_or("-"),
            code = %code,
            "Generated sequence code"
        );

        Ok(code)
    }

    /// Generates a code and inserts the row `build` makes from it.
    ///
    /// The insert runs in a savepoint. If it violates the scope's unique
    /// constraint, the savepoint is rolled back and a fresh code is
    /// generated, up to the configured number of retries.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UniquenessRace`] when every attempt collides,
    /// [`LedgerError::GenerationFailed`] if a code cannot be generated, or
    /// [`LedgerError::Database`] for any other insert failure.
    pub async fn insert_with_code<A, F>(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        scope: SequenceScope,
        date: NaiveDate,
        build: F,
    ) -> Result<<A::Entity as EntityTrait>::Model, LedgerError>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send + 'static,
        <A::Entity as EntityTrait>::Model: IntoActiveModel<A>,
        F: Fn(String) -> A + Send,
    {
        let target = SequenceTarget::of(scope);
        let mut attempt = 0;

        loop {
            let code = self.next_code(txn, tenant_id, scope, date).await?;

            let savepoint = txn.begin().await.step("open savepoint")?;
            match build(code.clone()).insert(&savepoint).await {
                Ok(model) => {
                    savepoint.commit().await.step("release savepoint")?;
                    return Ok(model);
                }
                Err(err) if is_unique_violation(&err, target.constraint) => {
                    savepoint
                        .rollback()
                        .await
                        .step("roll back savepoint")?;

                    if attempt >= self.retry_attempts {
                        warn!(
                            tenant_id = %tenant_id,
                            scope = %scope,
                            code = %code,
                            attempts = attempt + 1,
                            "Sequence code still colliding, giving up"
                        );
                        return Err(LedgerError::UniquenessRace { scope, code });
                    }

                    warn!(
                        tenant_id = %tenant_id,
                        scope = %scope,
                        code = %code,
                        "Sequence code collided, regenerating"
                    );
                    attempt += 1;
                }
                Err(err) => {
                    return Err(LedgerError::Database {
                        step: "insert sequenced row",
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
