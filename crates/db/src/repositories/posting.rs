//! Posting engine: turns business events into balanced journal entries.
//!
//! Every operation here runs inside the caller's transaction. The engine
//! never commits; if any step fails the caller's unit of work rolls back the
//! event row, its sequence code, and the partial journal together.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, Set};
use tracing::{error, info};
use uuid::Uuid;

use koperasi_core::events::{self, aggregate_cost};
use koperasi_core::ledger::{
    JournalCategory, JournalDraft, LedgerError, LedgerValidationError, SalePostingAccounts, codes,
    posting,
};
use koperasi_core::sequence::SequenceScope;
use koperasi_shared::types::AccountId;

use super::account::{AccountError, ChartOfAccounts};
use super::sequence::SequenceGenerator;
use crate::entities::{deposits, journal_entries, journal_lines, sale_items, sales};
use crate::error::DbResultExt;

/// A journal header with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryWithLines {
    /// The journal header.
    pub entry: journal_entries::Model,
    /// The journal lines, in posting order.
    pub lines: Vec<journal_lines::Model>,
}

/// Builds and persists journal entries for business events.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostingEngine {
    sequences: SequenceGenerator,
}

impl PostingEngine {
    /// Creates a posting engine numbering entries with `sequences`.
    #[must_use]
    pub const fn new(sequences: SequenceGenerator) -> Self {
        Self { sequences }
    }

    /// The generator used for journal numbers.
    #[must_use]
    pub const fn sequences(&self) -> &SequenceGenerator {
        &self.sequences
    }

    /// Posts a sale: debit cash / credit sales revenue for the total, plus
    /// debit COGS / credit inventory when the items carry a cost.
    ///
    /// The sale's journal back-reference is overwritten unconditionally, so
    /// posting the same sale twice leaves two entries and links the latest.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if a well-known account is
    /// missing, [`LedgerError::PostingInvariantViolation`] if the generated
    /// lines fail validation, or a sequence/database error.
    pub async fn post_sale(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        sale: &sales::Model,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        if sale.tenant_id != tenant_id {
            return Err(LedgerError::NotFound {
                entity: "sale",
                id: sale.id,
            });
        }

        let accounts = SalePostingAccounts {
            cash: resolve_account(txn, tenant_id, codes::CASH).await?,
            revenue: resolve_account(txn, tenant_id, codes::SALES_REVENUE).await?,
            cost_of_goods: resolve_account(txn, tenant_id, codes::COST_OF_GOODS_SOLD).await?,
            inventory: resolve_account(txn, tenant_id, codes::INVENTORY).await?,
        };

        let items = sale_items::Entity::find()
            .filter(sale_items::Column::SaleId.eq(sale.id))
            .all(txn)
            .await
            .step("load sale items")?;
        let cost = aggregate_cost(items.iter().map(|i| (i.quantity, i.unit_cost)));

        let draft = JournalDraft::new(
            sale.sale_date,
            posting::sale_description(&sale.sale_number),
            Some(sale.sale_number.clone()),
            JournalCategory::Sale,
            posting::sale_lines(&accounts, sale.total, cost),
        )
        .map_err(|source| invariant_violation("sale", tenant_id, &sale.sale_number, source))?;

        let posted = self.post_entry(txn, tenant_id, actor_id, &draft).await?;

        let linked = sales::Entity::update_many()
            .col_expr(sales::Column::JournalEntryId, Expr::value(posted.entry.id))
            .col_expr(sales::Column::UpdatedAt, Expr::value(now()))
            .filter(sales::Column::Id.eq(sale.id))
            .exec(txn)
            .await
            .step("link sale to journal entry")?;
        if linked.rows_affected == 0 {
            return Err(LedgerError::NotFound {
                entity: "sale",
                id: sale.id,
            });
        }

        info!(
            tenant_id = %tenant_id,
            sale_number = %sale.sale_number,
            journal_number = %posted.entry.journal_number,
            lines = posted.lines.len(),
            "Sale posted"
        );
        Ok(posted)
    }

    /// Posts a member deposit: debit cash / credit the category's capital
    /// account.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AccountNotFound`] if cash or the capital account
    /// is missing, or a sequence/database error.
    pub async fn post_deposit(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        deposit: &deposits::Model,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        if deposit.tenant_id != tenant_id {
            return Err(LedgerError::NotFound {
                entity: "deposit",
                id: deposit.id,
            });
        }

        let category = events::DepositCategory::from(deposit.category);
        let cash = resolve_account(txn, tenant_id, codes::CASH).await?;
        let capital = resolve_account(txn, tenant_id, category.capital_account_code()).await?;

        let draft = JournalDraft::new(
            deposit.deposit_date,
            posting::deposit_description(category),
            Some(deposit.reference_number.clone()),
            JournalCategory::Deposit,
            posting::deposit_lines(cash, capital, category, deposit.amount),
        )
        .map_err(|source| {
            invariant_violation("deposit", tenant_id, &deposit.reference_number, source)
        })?;

        let posted = self.post_entry(txn, tenant_id, actor_id, &draft).await?;

        let linked = deposits::Entity::update_many()
            .col_expr(deposits::Column::JournalEntryId, Expr::value(posted.entry.id))
            .col_expr(deposits::Column::UpdatedAt, Expr::value(now()))
            .filter(deposits::Column::Id.eq(deposit.id))
            .exec(txn)
            .await
            .step("link deposit to journal entry")?;
        if linked.rows_affected == 0 {
            return Err(LedgerError::NotFound {
                entity: "deposit",
                id: deposit.id,
            });
        }

        info!(
            tenant_id = %tenant_id,
            reference_number = %deposit.reference_number,
            journal_number = %posted.entry.journal_number,
            category = %category,
            "Deposit posted"
        );
        Ok(posted)
    }

    /// Numbers and writes a validated draft: header first, then its lines.
    ///
    /// # Errors
    ///
    /// Returns a sequence error if no journal number can be issued, or
    /// [`LedgerError::Database`] if a row cannot be written.
    pub async fn post_entry(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        actor_id: Uuid,
        draft: &JournalDraft,
    ) -> Result<JournalEntryWithLines, LedgerError> {
        let totals = draft.totals();
        let created_at = now();

        let entry = self
            .sequences
            .insert_with_code(
                txn,
                tenant_id,
                SequenceScope::Journal,
                draft.date(),
                |journal_number| journal_entries::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    tenant_id: Set(tenant_id),
                    journal_number: Set(journal_number),
                    entry_date: Set(draft.date()),
                    description: Set(draft.description().to_string()),
                    reference: Set(draft.reference().map(str::to_string)),
                    category: Set(draft.category().into()),
                    total_debit: Set(totals.total_debit),
                    total_credit: Set(totals.total_credit),
                    is_balanced: Set(totals.is_balanced),
                    created_by: Set(actor_id),
                    created_at: Set(created_at),
                    updated_at: Set(created_at),
                    deleted_at: Set(None),
                },
            )
            .await?;

        let mut lines = Vec::with_capacity(draft.lines().len());
        for line in draft.lines() {
            let model = journal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                journal_entry_id: Set(entry.id),
                account_id: Set(line.account_id.into_inner()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                note: Set(line.note.clone()),
                created_at: Set(created_at),
                deleted_at: Set(None),
            }
            .insert(txn)
            .await
            .step("insert journal line")?;
            lines.push(model);
        }

        info!(
            tenant_id = %tenant_id,
            journal_number = %entry.journal_number,
            category = %draft.category(),
            total = %totals.total_debit,
            "Journal entry posted"
        );
        Ok(JournalEntryWithLines { entry, lines })
    }
}

fn now() -> DateTimeWithTimeZone {
    Utc::now().into()
}

/// Resolves a well-known account code inside the posting transaction.
async fn resolve_account(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    code: &str,
) -> Result<AccountId, LedgerError> {
    match ChartOfAccounts::find_by_code(txn, tenant_id, code).await {
        Ok(account) => Ok(AccountId::from_uuid(account.id)),
        Err(AccountError::CodeNotFound(_)) => {
            error!(
                tenant_id = %tenant_id,
                account_code = code,
                "Required account missing from chart of accounts"
            );
            Err(LedgerError::AccountNotFound {
                code: code.to_string(),
            })
        }
        Err(err) => Err(LedgerError::Database {
            step: "resolve posting account",
            message: err.to_string(),
        }),
    }
}

/// Generated lines failed validation; this is a defect, not bad input.
fn invariant_violation(
    event: &'static str,
    tenant_id: Uuid,
    code: &str,
    source: LedgerValidationError,
) -> LedgerError {
    error!(
        tenant_id = %tenant_id,
        event,
        code,
        error = %source,
        "Posting produced invalid journal lines"
    );
    LedgerError::PostingInvariantViolation { event, source }
}
