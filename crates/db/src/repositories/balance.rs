//! Account balances and running ledgers read from posted journal lines.
//!
//! Soft-deleted entries and lines never contribute. Sums are folded in Rust
//! with `Decimal` so the sign convention lives in one place
//! ([`NormalSide::balance_change`](koperasi_core::ledger::NormalSide::balance_change)).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Order};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use koperasi_core::ledger::{AccountBalance, LedgerError, LedgerLine, LedgerRow, running_ledger};
use koperasi_shared::types::AccountId;

use super::account::{AccountError, ChartOfAccounts};
use crate::entities::{accounts, journal_entries, journal_lines};
use crate::error::DbResultExt;

/// Running ledger of one account over a date range.
#[derive(Debug, Clone, Serialize)]
pub struct AccountLedger {
    /// The account.
    pub account: accounts::Model,
    /// Balance from every line dated before the range.
    pub opening_balance: Decimal,
    /// Lines in the range with the balance after each one.
    pub rows: Vec<LedgerRow>,
    /// Balance after the last row.
    pub closing_balance: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct LedgerLineRow {
    entry_date: NaiveDate,
    journal_number: String,
    description: String,
    note: Option<String>,
    debit: Decimal,
    credit: Decimal,
}

impl From<LedgerLineRow> for LedgerLine {
    fn from(row: LedgerLineRow) -> Self {
        Self {
            date: row.entry_date,
            journal_number: row.journal_number,
            description: row.description,
            note: row.note,
            debit: row.debit,
            credit: row.credit,
        }
    }
}

/// Computes balances from journal lines.
#[derive(Debug, Clone)]
pub struct BalanceCalculator {
    db: DatabaseConnection,
}

impl BalanceCalculator {
    /// Creates a new balance calculator.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Balance of an account on its normal side, up to and including `as_of`.
    ///
    /// With no `as_of`, every posted line counts.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the account is not visible to the
    /// tenant, or a database error.
    pub async fn balance(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> Result<Decimal, LedgerError> {
        Ok(self
            .account_balance(tenant_id, account_id, as_of)
            .await?
            .balance())
    }

    /// Debit and credit totals of an account up to and including `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the account is not visible to the
    /// tenant, or a database error.
    pub async fn account_balance(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        as_of: Option<NaiveDate>,
    ) -> Result<AccountBalance, LedgerError> {
        let account = find_account(&self.db, tenant_id, account_id).await?;

        let mut query = posted_lines(tenant_id, account_id);
        if let Some(as_of) = as_of {
            query = query.filter(journal_entries::Column::EntryDate.lte(as_of));
        }

        sum_lines(&self.db, account, query).await
    }

    /// Lines of an account between `from` and `to` (both inclusive), each with
    /// the balance after it.
    ///
    /// The balance starts from everything posted before `from`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if the account is not visible to the
    /// tenant, or a database error.
    pub async fn running_ledger(
        &self,
        tenant_id: Uuid,
        account_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<AccountLedger, LedgerError> {
        let account = find_account(&self.db, tenant_id, account_id).await?;
        let normal_side = account.normal_side.into();

        let opening_balance = match from {
            Some(from) => {
                let before = posted_lines(tenant_id, account_id)
                    .filter(journal_entries::Column::EntryDate.lt(from));
                sum_lines(&self.db, account.clone(), before).await?.balance()
            }
            None => Decimal::ZERO,
        };

        let mut query = posted_lines(tenant_id, account_id)
            .select_only()
            .column(journal_entries::Column::EntryDate)
            .column(journal_entries::Column::JournalNumber)
            .column(journal_entries::Column::Description)
            .column(journal_lines::Column::Note)
            .column(journal_lines::Column::Debit)
            .column(journal_lines::Column::Credit);
        if let Some(from) = from {
            query = query.filter(journal_entries::Column::EntryDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(journal_entries::Column::EntryDate.lte(to));
        }

        let lines = query
            .order_by_asc(journal_entries::Column::EntryDate)
            .order_by(Expr::cust("length(journal_entries.journal_number)"), Order::Asc)
            .order_by_asc(journal_entries::Column::JournalNumber)
            .order_by_asc(journal_lines::Column::Id)
            .into_model::<LedgerLineRow>()
            .all(&self.db)
            .await
            .step("load ledger lines")?;

        let rows = running_ledger(
            normal_side,
            opening_balance,
            lines.into_iter().map(LedgerLine::from),
        );
        let closing_balance = rows.last().map_or(opening_balance, |r| r.running_balance);

        debug!(
            tenant_id = %tenant_id,
            account_code = %account.code,
            rows = rows.len(),
            "Running ledger built"
        );
        Ok(AccountLedger {
            account,
            opening_balance,
            rows,
            closing_balance,
        })
    }
}

/// Live lines of an account whose entry is live and owned by the tenant.
fn posted_lines(tenant_id: Uuid, account_id: Uuid) -> Select<journal_lines::Entity> {
    journal_lines::Entity::find()
        .join(
            JoinType::InnerJoin,
            journal_lines::Relation::JournalEntries.def(),
        )
        .filter(journal_lines::Column::AccountId.eq(account_id))
        .filter(journal_lines::Column::DeletedAt.is_null())
        .filter(journal_entries::Column::TenantId.eq(tenant_id))
        .filter(journal_entries::Column::DeletedAt.is_null())
}

async fn sum_lines<C>(
    conn: &C,
    account: accounts::Model,
    query: Select<journal_lines::Entity>,
) -> Result<AccountBalance, LedgerError>
where
    C: ConnectionTrait,
{
    let amounts: Vec<(Decimal, Decimal)> = query
        .select_only()
        .column(journal_lines::Column::Debit)
        .column(journal_lines::Column::Credit)
        .into_tuple()
        .all(conn)
        .await
        .step("sum journal lines")?;

    let mut balance = AccountBalance::new(AccountId::from_uuid(account.id), account.normal_side.into());
    for (debit, credit) in amounts {
        balance.add_line(debit, credit);
    }
    Ok(balance)
}

async fn find_account<C>(
    conn: &C,
    tenant_id: Uuid,
    account_id: Uuid,
) -> Result<accounts::Model, LedgerError>
where
    C: ConnectionTrait,
{
    ChartOfAccounts::find_by_id(conn, tenant_id, account_id)
        .await
        .map_err(|err| match err {
            AccountError::NotFound(id) => LedgerError::NotFound {
                entity: "account",
                id,
            },
            other => LedgerError::Database {
                step: "load account",
                message: other.to_string(),
            },
        })
}
