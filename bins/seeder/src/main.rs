//! Demo data seeder for the cooperative ledger.
//!
//! Seeds a demo cooperative with the default chart of accounts, a few members
//! and products, one principal deposit per member, and one sale. Activity is
//! only seeded the first time; later runs just top up the chart.
//!
//! Usage: cargo run --bin seeder

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use koperasi_core::events::{DepositCategory, PaymentMethod, SaleItemInput};
use koperasi_db::entities::{cooperatives, products};
use koperasi_db::repositories::{NewDeposit, NewMember, NewSale};
use koperasi_db::{ChartOfAccounts, DepositService, MemberService, SaleService};
use koperasi_shared::types::ProductId;
use koperasi_shared::{AppConfig, AppError, AppResult, LedgerConfig};

/// Demo cooperative ID (consistent for all seeds)
const DEMO_COOP_ID: Uuid = Uuid::from_u128(1);
/// Demo operator ID recorded as cashier and author
const DEMO_OPERATOR_ID: Uuid = Uuid::from_u128(2);

/// Code, name, selling price, purchase price, stock.
const PRODUCTS: &[(&str, &str, i64, Option<i64>, i32)] = &[
    ("BRS-5", "Rice 5kg", 75_000, Some(68_000), 40),
    ("MYK-2", "Cooking Oil 2L", 38_000, Some(34_500), 60),
    ("GLP-1", "Sugar 1kg", 17_500, Some(15_000), 80),
    ("SBN-1", "Bar Soap", 4_000, None, 120),
];

const MEMBERS: &[&str] = &["Siti Aminah", "Budi Santoso", "Dewi Lestari"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "koperasi=debug,sea_orm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run().await?;
    Ok(())
}

async fn run() -> AppResult<()> {
    let config = AppConfig::load()?;
    let db = koperasi_db::connect(&config.database).await.map_err(db_err)?;
    info!("Connected to database");

    let created = seed_cooperative(&db).await?;

    let inserted = ChartOfAccounts::new(db.clone())
        .seed_default_chart(DEMO_COOP_ID)
        .await?;
    info!(inserted, "Chart of accounts ready");

    if created {
        seed_activity(&db, &config.ledger).await?;
    } else {
        info!("Demo cooperative already exists, skipping activity");
    }

    info!("Seeding complete");
    Ok(())
}

fn db_err(err: DbErr) -> AppError {
    AppError::Database(err.to_string())
}

/// Inserts the demo cooperative; returns false if it already exists.
async fn seed_cooperative(db: &DatabaseConnection) -> AppResult<bool> {
    if cooperatives::Entity::find_by_id(DEMO_COOP_ID)
        .one(db)
        .await
        .map_err(db_err)?
        .is_some()
    {
        return Ok(false);
    }

    cooperatives::ActiveModel {
        id: Set(DEMO_COOP_ID),
        name: Set("Koperasi Sejahtera Bersama".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .map_err(db_err)?;
    info!(tenant_id = %DEMO_COOP_ID, "Demo cooperative created");
    Ok(true)
}

async fn seed_activity(db: &DatabaseConnection, settings: &LedgerConfig) -> AppResult<()> {
    let day = NaiveDate::from_ymd_opt(2025, 1, 16)
        .ok_or_else(|| AppError::Internal("invalid seed date".to_string()))?;

    let mut catalog = Vec::with_capacity(PRODUCTS.len());
    for &(code, name, price, purchase_price, stock) in PRODUCTS {
        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            tenant_id: Set(DEMO_COOP_ID),
            code: Set(code.to_string()),
            name: Set(name.to_string()),
            price: Set(Decimal::from(price)),
            purchase_price: Set(purchase_price.map(Decimal::from)),
            stock: Set(stock),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(db_err)?;
        catalog.push(product);
    }
    info!(count = catalog.len(), "Products seeded");

    let members = MemberService::new(db.clone(), settings.clone());
    let deposits = DepositService::new(db.clone(), settings.clone());
    for full_name in MEMBERS {
        let member = members
            .register_member(
                DEMO_COOP_ID,
                NewMember {
                    full_name: (*full_name).to_string(),
                    joined_on: Some(day),
                },
            )
            .await?;

        deposits
            .record_deposit(
                DEMO_COOP_ID,
                DEMO_OPERATOR_ID,
                NewDeposit {
                    member_id: member.id,
                    category: DepositCategory::Principal,
                    amount: Decimal::from(100_000),
                    deposit_date: Some(day),
                    note: Some("Joining capital".to_string()),
                },
            )
            .await?;
    }

    let items = catalog
        .iter()
        .take(3)
        .map(|p| SaleItemInput {
            product_id: ProductId::from_uuid(p.id),
            quantity: 1,
            unit_price: p.price,
        })
        .collect();
    let sale = SaleService::new(db.clone(), settings.clone())
        .process_sale(
            DEMO_COOP_ID,
            DEMO_OPERATOR_ID,
            NewSale {
                member_id: None,
                sale_date: Some(day),
                items,
                amount_paid: Decimal::from(150_000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await?;
    info!(
        sale_number = %sale.sale.sale_number,
        change = %sale.sale.change_due,
        "Demo sale recorded"
    );

    Ok(())
}
