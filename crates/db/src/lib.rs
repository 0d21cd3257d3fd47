//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - The sequence generator, chart of accounts, posting engine, and balance
//!   calculator
//! - Transactional handlers for sales, deposits, and member registration
//! - Database migrations

#[allow(missing_docs)]
pub mod entities;
mod error;
pub mod migration;
pub mod repositories;
pub mod unit_of_work;

pub use repositories::{
    AccountError, BalanceCalculator, ChartOfAccounts, DepositService, JournalService,
    MemberService, PostingEngine, SaleService, SequenceGenerator,
};
pub use unit_of_work::{UnitOfWork, UnitOfWorkExt};

use std::time::Duration;

use koperasi_shared::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Establishes a pooled connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .sqlx_logging(false);

    Database::connect(options).await
}
