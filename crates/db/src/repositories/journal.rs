//! Manual journal entries, reversals, and soft deletion.

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use tracing::info;
use uuid::Uuid;

use koperasi_core::ledger::{JournalCategory, JournalDraft, JournalLine, LedgerError, posting};
use koperasi_shared::LedgerConfig;
use koperasi_shared::types::AccountId;

use super::account::{AccountError, ChartOfAccounts};
use super::posting::{JournalEntryWithLines, PostingEngine};
use super::sequence::SequenceGenerator;
use crate::entities::{journal_entries, journal_lines};
use crate::error::DbResultExt;
use crate::unit_of_work::UnitOfWorkExt;

/// Input for a hand-entered journal entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    /// Entry date; today's business date when omitted.
    pub entry_date: Option<NaiveDate>,
    /// Header description.
    pub description: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Proposed lines.
    pub lines: Vec<JournalLine>,
}

/// Journal service owning the unit of work for manual postings.
#[derive(Debug, Clone)]
pub struct JournalService {
    db: DatabaseConnection,
    engine: PostingEngine,
    settings: LedgerConfig,
}

impl JournalService {
    /// Creates a new journal service.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerConfig) -> Self {
        let engine = PostingEngine::new(SequenceGenerator::new(settings.sequence_retry_attempts));
        Self {
            db,
            engine,
            settings,
        }
    }

    /// Validates and posts a manual journal entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Validation`] if the lines break a double-entry
    /// rule, [`LedgerError::NotFound`] if a line's account is not an active
    /// account of the tenant, or a sequence/database error.
    pub async fn create_manual_entry(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        input: NewJournalEntry,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        let draft = JournalDraft::new(
            input.entry_date.unwrap_or_else(|| self.settings.today()),
            input.description,
            input.reference,
            JournalCategory::Manual,
            input.lines,
        )?;

        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let result = self
            .post_manual(uow.transaction(), tenant_id, actor_id, &draft)
            .await;
        uow.complete(result).await
    }

    async fn post_manual(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        draft: &JournalDraft,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        for line in draft.lines() {
            let id = line.account_id.into_inner();
            let account = ChartOfAccounts::find_by_id(txn, tenant_id, id)
                .await
                .map_err(|err| account_error(err, id))?;
            if !account.is_active {
                return Err(LedgerError::NotFound {
                    entity: "account",
                    id,
                });
            }
        }

        self.engine.post_entry(txn, tenant_id, actor_id, draft).await
    }

    /// Loads a live journal entry and its live lines.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the entry is missing, deleted, or
    /// owned by another tenant.
    pub async fn get_entry(
        &self,
        tenant_id: Uuid,
        entry_id: Uuid,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        load_entry(&self.db, tenant_id, entry_id).await
    }

    /// Posts the mirror image of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the entry is not visible to the
    /// tenant, [`LedgerError::Validation`] if it has no lines to reverse, or
    /// a sequence/database error.
    pub async fn reverse_entry(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        entry_id: Uuid,
        note: Option<&str>,
        reversal_date: Option<NaiveDate>,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let date = reversal_date.unwrap_or_else(|| self.settings.today());
        let result = self
            .post_reversal(uow.transaction(), tenant_id, actor_id, entry_id, note, date)
            .await;
        uow.complete(result).await
    }

    async fn post_reversal(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        entry_id: Uuid,
        note: Option<&str>,
        date: NaiveDate,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        let original = load_entry(txn, tenant_id, entry_id).await?;

        let lines: Vec<JournalLine> = original
            .lines
            .iter()
            .map(|line| JournalLine {
                account_id: AccountId::from_uuid(line.account_id),
                debit: line.debit,
                credit: line.credit,
                note: line.note.clone(),
            })
            .collect();

        let draft = JournalDraft::new(
            date,
            posting::reversal_description(&original.entry.description, note),
            Some(posting::reversal_reference(&original.entry.journal_number)),
            JournalCategory::Reversal,
            posting::reversal_lines(&lines),
        )?;

        let reversal = self.engine.post_entry(txn, tenant_id, actor_id, &draft).await?;
        info!(
            tenant_id = %tenant_id,
            journal_number = %reversal.entry.journal_number,
            reversed = %original.entry.journal_number,
            "Journal entry reversed"
        );
        Ok(reversal)
    }

    /// Soft-deletes an entry and all of its lines.
    ///
    /// The journal number stays reserved.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the entry is not visible to the
    /// tenant, or a database error.
    pub async fn delete_entry(&self, tenant_id: Uuid, entry_id: Uuid) -> Result<(), LedgerError> {
        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let result = soft_delete(uow.transaction(), tenant_id, entry_id).await;
        uow.complete(result).await
    }
}

async fn soft_delete(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    entry_id: Uuid,
) -> Result<(), LedgerError> {
    let entry = load_entry(txn, tenant_id, entry_id).await?;
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();

    journal_lines::Entity::update_many()
        .col_expr(journal_lines::Column::DeletedAt, Expr::value(now))
        .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
        .filter(journal_lines::Column::DeletedAt.is_null())
        .exec(txn)
        .await
        .step("soft-delete journal lines")?;

    journal_entries::Entity::update_many()
        .col_expr(journal_entries::Column::DeletedAt, Expr::value(now))
        .col_expr(journal_entries::Column::UpdatedAt, Expr::value(now))
        .filter(journal_entries::Column::Id.eq(entry_id))
        .exec(txn)
        .await
        .step("soft-delete journal entry")?;

    info!(
        tenant_id = %tenant_id,
        journal_number = %entry.entry.journal_number,
        "Journal entry deleted"
    );
    Ok(())
}

/// Loads a live entry with its live lines, scoped to the tenant.
async fn load_entry<C>(
    conn: &C,
    tenant_id: Uuid,
    entry_id: Uuid,
) -> Result<JournalEntryWithLines, LedgerError>
where
    C: sea_orm::ConnectionTrait,
{
    let entry = journal_entries::Entity::find_by_id(entry_id)
        .filter(journal_entries::Column::TenantId.eq(tenant_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
        .one(conn)
        .await
        .step("load journal entry")?
        .ok_or(LedgerError::NotFound {
            entity: "journal entry",
            id: entry_id,
        })?;

    let lines = journal_lines::Entity::find()
        .filter(journal_lines::Column::JournalEntryId.eq(entry_id))
        .filter(journal_lines::Column::DeletedAt.is_null())
        .order_by_asc(journal_lines::Column::Id)
        .all(conn)
        .await
        .step("load journal lines")?;

    Ok(JournalEntryWithLines { entry, lines })
}

fn account_error(err: AccountError, id: Uuid) -> LedgerError {
    match err {
        AccountError::NotFound(_) => LedgerError::NotFound {
            entity: "account",
            id,
        },
        other => LedgerError::Database {
            step: "resolve journal account",
            message: other.to_string(),
        },
    }
}
