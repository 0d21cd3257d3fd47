//! Member deposit handler.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, DatabaseTransaction, Set};
use tracing::info;
use uuid::Uuid;

use koperasi_core::events::{DepositCategory, DepositDraft, EventError};
use koperasi_core::sequence::SequenceScope;
use koperasi_shared::LedgerConfig;

use super::member::MemberService;
use super::posting::{JournalEntryWithLines, PostingEngine};
use super::sequence::SequenceGenerator;
use crate::entities::deposits;
use crate::error::DbResultExt;
use crate::unit_of_work::UnitOfWorkExt;

/// Input for recording a deposit.
#[derive(Debug, Clone)]
pub struct NewDeposit {
    /// Depositing member.
    pub member_id: Uuid,
    /// Capital category.
    pub category: DepositCategory,
    /// Amount deposited.
    pub amount: Decimal,
    /// Deposit date; today's business date when omitted.
    pub deposit_date: Option<NaiveDate>,
    /// Free-form note.
    pub note: Option<String>,
}

/// A recorded deposit with its journal entry.
#[derive(Debug, Clone)]
pub struct DepositWithJournal {
    /// The deposit, linked to its journal entry.
    pub deposit: deposits::Model,
    /// The posted journal entry.
    pub journal: JournalEntryWithLines,
}

/// Deposit service owning the unit of work for deposits.
#[derive(Debug, Clone)]
pub struct DepositService {
    db: DatabaseConnection,
    engine: PostingEngine,
    settings: LedgerConfig,
}

impl DepositService {
    /// Creates a new deposit service.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerConfig) -> Self {
        let engine = PostingEngine::new(SequenceGenerator::new(settings.sequence_retry_attempts));
        Self {
            db,
            engine,
            settings,
        }
    }

    /// Records a deposit and posts it to the journal.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InvalidAmount`] for a non-positive amount,
    /// [`EventError::MemberNotFound`] or [`EventError::MemberInactive`], or a
    /// failed posting.
    pub async fn record_deposit(
        &self,
        tenant_id: Uuid,
        actor_id: Uuid,
        input: NewDeposit,
    ) -> Result<DepositWithJournal, EventError> {
        let draft = DepositDraft::new(input.category, input.amount)?;
        let deposit_date = input.deposit_date.unwrap_or_else(|| self.settings.today());

        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let result = self
            .record(uow.transaction(), tenant_id, actor_id, deposit_date, &input, draft)
            .await;
        let recorded = uow.complete(result).await?;

        info!(
            tenant_id = %tenant_id,
            reference_number = %recorded.deposit.reference_number,
            journal_number = %recorded.journal.entry.journal_number,
            amount = %recorded.deposit.amount,
            "Deposit recorded"
        );
        Ok(recorded)
    }

    async fn record(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        deposit_date: NaiveDate,
        input: &NewDeposit,
        draft: DepositDraft,
    ) -> Result<DepositWithJournal, EventError> {
        let member = MemberService::find_member(txn, tenant_id, input.member_id)
            .await?
            .ok_or(EventError::MemberNotFound(input.member_id))?;
        if !member.is_active {
            return Err(EventError::MemberInactive(member.id));
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut deposit = self
            .engine
            .sequences()
            .insert_with_code(
                txn,
                tenant_id,
                SequenceScope::Deposit,
                deposit_date,
                |reference_number| deposits::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    tenant_id: Set(tenant_id),
                    member_id: Set(member.id),
                    category: Set(draft.category().into()),
                    deposit_date: Set(deposit_date),
                    amount: Set(draft.amount()),
                    reference_number: Set(reference_number),
                    note: Set(input.note.clone()),
                    journal_entry_id: Set(None),
                    created_by: Set(actor_id),
                    created_at: Set(now),
                    updated_at: Set(now),
                },
            )
            .await?;

        let journal = self
            .engine
            .post_deposit(txn, tenant_id, actor_id, &deposit)
            .await?;
        deposit.journal_entry_id = Some(journal.entry.id);

        Ok(DepositWithJournal { deposit, journal })
    }
}
