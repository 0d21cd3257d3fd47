//! Chart of accounts: tenant-scoped lookups and administration.
//!
//! Lookups take any connection so the posting engine can resolve accounts
//! inside its own transaction. A code or id owned by another tenant is
//! reported exactly like a missing one.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};
use uuid::Uuid;

use koperasi_core::ledger;
use koperasi_shared::AppError;

use crate::entities::{
    accounts, journal_lines,
    sea_orm_active_enums::{AccountType, NormalSide},
};

/// Error types for chart of accounts operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account code already exists in the tenant.
    #[error("Account code '{0}' already exists")]
    DuplicateCode(String),

    /// Parent account not found in the tenant.
    #[error("Parent account not found: {0}")]
    ParentNotFound(Uuid),

    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// No account with this code in the tenant.
    #[error("Account code not found: {0}")]
    CodeNotFound(String),

    /// Cannot delete an account that has journal lines.
    #[error("Cannot delete account: account has {0} journal lines")]
    HasJournalLines(u64),

    /// Cannot delete an account that has active children.
    #[error("Cannot delete account: account has {0} child accounts")]
    HasChildren(u64),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateCode(_) => "DUPLICATE_CODE",
            Self::ParentNotFound(_) => "PARENT_NOT_FOUND",
            Self::NotFound(_) | Self::CodeNotFound(_) => "NOT_FOUND",
            Self::HasJournalLines(_) | Self::HasChildren(_) => "ACCOUNT_IN_USE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::CodeNotFound(_) => 404,
            Self::DuplicateCode(_) | Self::HasJournalLines(_) | Self::HasChildren(_) => 409,
            Self::ParentNotFound(_) => 422,
            Self::Database(_) => 500,
        }
    }

    /// Chart administration is never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        let message = err.to_string();
        match err {
            AccountError::NotFound(_) | AccountError::CodeNotFound(_) => Self::NotFound(message),
            AccountError::DuplicateCode(_)
            | AccountError::HasJournalLines(_)
            | AccountError::HasChildren(_) => Self::Conflict(message),
            AccountError::ParentNotFound(_) => Self::Validation(message),
            AccountError::Database(_) => Self::Database(message),
        }
    }
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning cooperative.
    pub tenant_id: Uuid,
    /// Account code (must be unique within the tenant).
    pub code: String,
    /// Account name.
    pub name: String,
    /// Account type (asset, liability, equity, revenue, expense).
    pub account_type: AccountType,
    /// Normal side; derived from the type when omitted.
    pub normal_side: Option<NormalSide>,
    /// Parent account ID for hierarchical structure.
    pub parent_id: Option<Uuid>,
    /// Account description.
    pub description: Option<String>,
}

/// One row of the standard cooperative chart.
struct DefaultAccount {
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent: Option<&'static str>,
}

const fn default_account(
    code: &'static str,
    name: &'static str,
    account_type: AccountType,
    parent: Option<&'static str>,
) -> DefaultAccount {
    DefaultAccount {
        code,
        name,
        account_type,
        parent,
    }
}

/// Standard cooperative chart, parents listed before their children.
const DEFAULT_CHART: &[DefaultAccount] = &[
    default_account("1000", "Assets", AccountType::Asset, None),
    default_account("1100", "Current Assets", AccountType::Asset, Some("1000")),
    default_account("1101", "Cash", AccountType::Asset, Some("1100")),
    default_account("1102", "Bank", AccountType::Asset, Some("1100")),
    default_account("1200", "Receivables", AccountType::Asset, Some("1000")),
    default_account("1201", "Member Receivables", AccountType::Asset, Some("1200")),
    default_account("1300", "Inventory", AccountType::Asset, Some("1000")),
    default_account("1301", "Merchandise Inventory", AccountType::Asset, Some("1300")),
    default_account("2000", "Liabilities", AccountType::Liability, None),
    default_account("2100", "Current Liabilities", AccountType::Liability, Some("2000")),
    default_account("2101", "Accounts Payable", AccountType::Liability, Some("2100")),
    default_account("3000", "Equity", AccountType::Equity, None),
    default_account("3100", "Cooperative Capital", AccountType::Equity, Some("3000")),
    default_account("3101", "Principal Savings", AccountType::Equity, Some("3100")),
    default_account("3102", "Mandatory Savings", AccountType::Equity, Some("3100")),
    default_account("3103", "Voluntary Savings", AccountType::Equity, Some("3100")),
    default_account("3200", "Residual Income", AccountType::Equity, Some("3000")),
    default_account("3201", "Current Year Residual Income", AccountType::Equity, Some("3200")),
    default_account("4000", "Revenue", AccountType::Revenue, None),
    default_account("4100", "Operating Revenue", AccountType::Revenue, Some("4000")),
    default_account("4101", "Sales", AccountType::Revenue, Some("4100")),
    default_account("4200", "Other Revenue", AccountType::Revenue, Some("4000")),
    default_account("5000", "Expenses", AccountType::Expense, None),
    default_account("5100", "Operating Expenses", AccountType::Expense, Some("5000")),
    default_account("5101", "Salaries", AccountType::Expense, Some("5100")),
    default_account("5102", "Electricity", AccountType::Expense, Some("5100")),
    default_account("5103", "Water", AccountType::Expense, Some("5100")),
    default_account("5104", "Telephone & Internet", AccountType::Expense, Some("5100")),
    default_account("5200", "Cost of Goods Sold", AccountType::Expense, Some("5000")),
    default_account("5201", "COGS", AccountType::Expense, Some("5200")),
];

/// Normal side implied by an account type.
fn default_normal_side(account_type: AccountType) -> NormalSide {
    ledger::AccountType::from(account_type)
        .default_normal_side()
        .into()
}

/// Chart of accounts repository.
#[derive(Debug, Clone)]
pub struct ChartOfAccounts {
    db: DatabaseConnection,
}

impl ChartOfAccounts {
    /// Creates a new chart of accounts repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a live account by code within a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::CodeNotFound`] if the tenant has no such code.
    pub async fn find_by_code<C>(
        conn: &C,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<accounts::Model, AccountError>
    where
        C: ConnectionTrait,
    {
        debug!(tenant_id = %tenant_id, account_code = code, "Looking up account by code");

        accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id))
            .filter(accounts::Column::Code.eq(code))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(conn)
            .await?
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))
    }

    /// Finds a live account by ID within a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if the account is missing, deleted,
    /// or owned by another tenant.
    pub async fn find_by_id<C>(
        conn: &C,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<accounts::Model, AccountError>
    where
        C: ConnectionTrait,
    {
        accounts::Entity::find_by_id(id)
            .filter(accounts::Column::TenantId.eq(tenant_id))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(conn)
            .await?
            .ok_or(AccountError::NotFound(id))
    }

    /// Lists the live children of an account, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] if the parent is not visible to the
    /// tenant.
    pub async fn children<C>(
        conn: &C,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Vec<accounts::Model>, AccountError>
    where
        C: ConnectionTrait,
    {
        Self::find_by_id(conn, tenant_id, id).await?;

        let children = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id))
            .filter(accounts::Column::ParentId.eq(id))
            .filter(accounts::Column::DeletedAt.is_null())
            .order_by_asc(accounts::Column::Code)
            .all(conn)
            .await?;

        Ok(children)
    }

    /// Lists a tenant's live accounts ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, tenant_id: Uuid) -> Result<Vec<accounts::Model>, AccountError> {
        let accounts = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id))
            .filter(accounts::Column::DeletedAt.is_null())
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;

        Ok(accounts)
    }

    /// Creates a new account with validation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account code already exists in the tenant
    /// - Parent account does not exist in the tenant
    pub async fn create_account(
        &self,
        input: CreateAccountInput,
    ) -> Result<accounts::Model, AccountError> {
        let existing = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(input.tenant_id))
            .filter(accounts::Column::Code.eq(&input.code))
            .filter(accounts::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(AccountError::DuplicateCode(input.code));
        }

        if let Some(parent_id) = input.parent_id {
            match Self::find_by_id(&self.db, input.tenant_id, parent_id).await {
                Ok(_) => {}
                Err(AccountError::NotFound(_)) => {
                    return Err(AccountError::ParentNotFound(parent_id));
                }
                Err(err) => return Err(err),
            }
        }

        let now = Utc::now().into();
        let account = accounts::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(input.tenant_id),
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type),
            normal_side: Set(input
                .normal_side
                .unwrap_or_else(|| default_normal_side(input.account_type))),
            parent_id: Set(input.parent_id),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let account = account.insert(&self.db).await?;
        info!(
            tenant_id = %account.tenant_id,
            account_code = %account.code,
            "Account created"
        );
        Ok(account)
    }

    /// Soft-deletes an account.
    ///
    /// Accounts with journal lines or live children cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Account not found
    /// - Account has journal lines
    /// - Account has child accounts
    pub async fn delete_account(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AccountError> {
        let account = Self::find_by_id(&self.db, tenant_id, id).await?;

        let line_count = journal_lines::Entity::find()
            .filter(journal_lines::Column::AccountId.eq(id))
            .filter(journal_lines::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        if line_count > 0 {
            return Err(AccountError::HasJournalLines(line_count));
        }

        let child_count = accounts::Entity::find()
            .filter(accounts::Column::ParentId.eq(id))
            .filter(accounts::Column::DeletedAt.is_null())
            .count(&self.db)
            .await?;
        if child_count > 0 {
            return Err(AccountError::HasChildren(child_count));
        }

        let now = Utc::now().into();
        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(false);
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;

        Ok(())
    }

    /// Inserts the standard cooperative chart for a tenant.
    ///
    /// Codes the tenant already has are left untouched, so running this twice
    /// is harmless. Returns the number of accounts inserted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn seed_default_chart(&self, tenant_id: Uuid) -> Result<usize, AccountError> {
        let txn = self.db.begin().await?;

        let mut ids: HashMap<String, Uuid> = accounts::Entity::find()
            .filter(accounts::Column::TenantId.eq(tenant_id))
            .filter(accounts::Column::DeletedAt.is_null())
            .all(&txn)
            .await?
            .into_iter()
            .map(|a| (a.code, a.id))
            .collect();

        let now = Utc::now().into();
        let mut inserted = 0;
        for row in DEFAULT_CHART {
            if ids.contains_key(row.code) {
                continue;
            }

            let id = Uuid::now_v7();
            accounts::ActiveModel {
                id: Set(id),
                tenant_id: Set(tenant_id),
                code: Set(row.code.to_string()),
                name: Set(row.name.to_string()),
                account_type: Set(row.account_type),
                normal_side: Set(default_normal_side(row.account_type)),
                parent_id: Set(row.parent.and_then(|p| ids.get(p).copied())),
                description: Set(None),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(&txn)
            .await?;

            ids.insert(row.code.to_string(), id);
            inserted += 1;
        }

        txn.commit().await?;
        info!(tenant_id = %tenant_id, inserted, "Default chart of accounts seeded");
        Ok(inserted)
    }
}
