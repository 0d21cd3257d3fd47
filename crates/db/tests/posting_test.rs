//! Integration tests for sale and deposit postings.
//!
//! Requires a running PostgreSQL; tests skip when it is unavailable.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use koperasi_core::events::{DepositCategory, EventError, PaymentMethod, SaleItemInput};
use koperasi_core::ledger::LedgerError;
use koperasi_db::entities::{accounts, cooperatives, journal_lines, products, sales};
use koperasi_db::repositories::{NewDeposit, NewSale};
use koperasi_db::{DepositService, PostingEngine, SaleService, SequenceGenerator, UnitOfWork};
use koperasi_shared::types::ProductId;

use common::*;

fn item(product: &products::Model, quantity: i32) -> SaleItemInput {
    SaleItemInput {
        product_id: ProductId::from_uuid(product.id),
        quantity,
        unit_price: product.price,
    }
}

fn line_for(lines: &[journal_lines::Model], account_id: Uuid) -> &journal_lines::Model {
    lines
        .iter()
        .find(|l| l.account_id == account_id)
        .expect("no line for account")
}

#[tokio::test]
async fn test_deposit_posts_cash_and_capital() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let member = create_member(&db, tenant_id).await;
    let actor_id = Uuid::now_v7();

    let service = DepositService::new(db.clone(), settings());
    let recorded = service
        .record_deposit(
            tenant_id,
            actor_id,
            NewDeposit {
                member_id: member.id,
                category: DepositCategory::Mandatory,
                amount: dec!(50000),
                deposit_date: Some(date(2025, 1, 16)),
                note: None,
            },
        )
        .await
        .expect("deposit failed");

    assert_eq!(recorded.deposit.reference_number, "SMP-20250116-0001");
    assert_eq!(recorded.deposit.journal_entry_id, Some(recorded.journal.entry.id));

    let entry = &recorded.journal.entry;
    assert!(entry.journal_number.starts_with("JRN-20250116-"));
    assert_eq!(entry.description, "Mandatory deposit");
    assert_eq!(entry.reference.as_deref(), Some("SMP-20250116-0001"));
    assert_eq!(entry.total_debit, dec!(50000));
    assert_eq!(entry.total_credit, dec!(50000));
    assert!(entry.is_balanced);

    let cash = account_id(&db, tenant_id, "1101").await;
    let capital = account_id(&db, tenant_id, "3102").await;
    assert_eq!(recorded.journal.lines.len(), 2);
    assert_eq!(line_for(&recorded.journal.lines, cash).debit, dec!(50000));
    assert_eq!(line_for(&recorded.journal.lines, capital).credit, dec!(50000));

    let second = service
        .record_deposit(
            tenant_id,
            actor_id,
            NewDeposit {
                member_id: member.id,
                category: DepositCategory::Voluntary,
                amount: dec!(25000),
                deposit_date: Some(date(2025, 1, 16)),
                note: Some("second".to_string()),
            },
        )
        .await
        .expect("second deposit failed");
    assert_eq!(second.deposit.reference_number, "SMP-20250116-0002");

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_deposit_rolls_back_when_capital_account_missing() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let member = create_member(&db, tenant_id).await;

    // Rename 3102 so the well-known code no longer resolves.
    let capital = accounts::Entity::find_by_id(account_id(&db, tenant_id, "3102").await)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let mut active: accounts::ActiveModel = capital.into();
    active.code = Set("3199".to_string());
    active.update(&db).await.unwrap();

    let before = row_counts(&db, tenant_id).await;
    let result = DepositService::new(db.clone(), settings())
        .record_deposit(
            tenant_id,
            Uuid::now_v7(),
            NewDeposit {
                member_id: member.id,
                category: DepositCategory::Mandatory,
                amount: dec!(50000),
                deposit_date: Some(date(2025, 1, 16)),
                note: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(EventError::Ledger(LedgerError::AccountNotFound { ref code })) if code == "3102"
    ));
    assert_eq!(row_counts(&db, tenant_id).await, before);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_sale_with_cost_posts_four_lines() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let cashier_id = Uuid::now_v7();

    let rice = create_product(&db, tenant_id, dec!(25000), Some(dec!(20000)), 10).await;
    let oil = create_product(&db, tenant_id, dec!(50000), Some(dec!(42000)), 5).await;
    let soap = create_product(&db, tenant_id, dec!(10000), None, 20).await;

    let recorded = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            cashier_id,
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&rice, 2), item(&oil, 1), item(&soap, 3)],
                amount_paid: dec!(150000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await
        .expect("sale failed");

    assert_eq!(recorded.sale.sale_number, "POS-20250116-0001");
    assert_eq!(recorded.sale.total, dec!(130000));
    assert_eq!(recorded.sale.change_due, dec!(20000));
    assert_eq!(recorded.items.len(), 3);
    assert_eq!(recorded.items[0].product_name, rice.name);
    assert_eq!(recorded.items[2].unit_cost, None);

    // Cost = 2 x 20000 + 1 x 42000; soap has no purchase price.
    let cost = dec!(82000);
    let lines = &recorded.journal.lines;
    assert_eq!(lines.len(), 4);
    assert_eq!(line_for(lines, account_id(&db, tenant_id, "1101").await).debit, dec!(130000));
    assert_eq!(line_for(lines, account_id(&db, tenant_id, "4101").await).credit, dec!(130000));
    assert_eq!(line_for(lines, account_id(&db, tenant_id, "5201").await).debit, cost);
    assert_eq!(line_for(lines, account_id(&db, tenant_id, "1301").await).credit, cost);

    let entry = &recorded.journal.entry;
    assert_eq!(entry.description, "Sale POS-20250116-0001");
    assert_eq!(entry.reference.as_deref(), Some("POS-20250116-0001"));
    assert_eq!(entry.total_debit, dec!(130000) + cost);

    let stored = sales::Entity::find_by_id(recorded.sale.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.journal_entry_id, Some(entry.id));

    let rice_after = products::Entity::find_by_id(rice.id).one(&db).await.unwrap().unwrap();
    assert_eq!(rice_after.stock, 8);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_sale_without_cost_posts_two_lines() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;

    let product = create_product(&db, tenant_id, dec!(15000), None, 3).await;
    let recorded = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 1)],
                amount_paid: dec!(15000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await
        .expect("sale failed");

    assert_eq!(recorded.journal.lines.len(), 2);
    assert_eq!(recorded.sale.change_due, Decimal::ZERO);
    assert!(recorded.journal.entry.is_balanced);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_sale_rolls_back_on_insufficient_stock() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;

    let plenty = create_product(&db, tenant_id, dec!(10000), Some(dec!(8000)), 10).await;
    let scarce = create_product(&db, tenant_id, dec!(20000), Some(dec!(15000)), 1).await;

    let before = row_counts(&db, tenant_id).await;
    let result = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&plenty, 2), item(&scarce, 2)],
                amount_paid: dec!(100000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(EventError::InsufficientStock { available: 1, requested: 2, .. })
    ));
    assert_eq!(row_counts(&db, tenant_id).await, before);

    let plenty_after = products::Entity::find_by_id(plenty.id).one(&db).await.unwrap().unwrap();
    assert_eq!(plenty_after.stock, 10, "stock decrement must roll back");

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_sub_cent_sale_writes_nothing() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let product = create_product(&db, tenant_id, dec!(10000), Some(dec!(8000)), 10).await;

    let before = row_counts(&db, tenant_id).await;
    let result = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![SaleItemInput {
                    unit_price: dec!(0.004),
                    ..item(&product, 1)
                }],
                amount_paid: dec!(1),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await;

    assert!(matches!(result, Err(EventError::ExcessPrecision { .. })));
    assert_eq!(row_counts(&db, tenant_id).await, before);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_sale_rolls_back_when_chart_is_missing() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_tenant(&db).await;
    let product = create_product(&db, tenant_id, dec!(10000), None, 5).await;

    let result = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 1)],
                amount_paid: dec!(10000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(EventError::Ledger(LedgerError::AccountNotFound { ref code })) if code == "1101"
    ));
    let counts = row_counts(&db, tenant_id).await;
    assert_eq!(counts.sales, 0);
    assert_eq!(counts.sale_items, 0);
    assert_eq!(counts.journal_entries, 0);

    let product_after = products::Entity::find_by_id(product.id).one(&db).await.unwrap().unwrap();
    assert_eq!(product_after.stock, 5);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_posting_a_sale_twice_links_the_latest_entry() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let cashier_id = Uuid::now_v7();

    let product = create_product(&db, tenant_id, dec!(12000), Some(dec!(9000)), 4).await;
    let recorded = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            cashier_id,
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 1)],
                amount_paid: dec!(12000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await
        .expect("sale failed");

    let engine = PostingEngine::new(SequenceGenerator::new(2));
    let uow = UnitOfWork::begin(&db, &settings()).await.unwrap();
    let again = engine
        .post_sale(uow.transaction(), tenant_id, cashier_id, &recorded.sale)
        .await
        .expect("second posting failed");
    uow.commit().await.unwrap();

    assert_ne!(again.entry.id, recorded.journal.entry.id);
    assert_ne!(again.entry.journal_number, recorded.journal.entry.journal_number);
    assert_eq!(row_counts(&db, tenant_id).await.journal_entries, 2);

    let stored = sales::Entity::find_by_id(recorded.sale.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.journal_entry_id, Some(again.entry.id));

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_post_sale_rejects_other_tenants_sale() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let other_tenant = create_seeded_tenant(&db).await;

    let product = create_product(&db, tenant_id, dec!(5000), None, 2).await;
    let recorded = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: None,
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 1)],
                amount_paid: dec!(5000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await
        .expect("sale failed");

    let uow = UnitOfWork::begin(&db, &settings()).await.unwrap();
    let result = PostingEngine::default()
        .post_sale(uow.transaction(), other_tenant, Uuid::now_v7(), &recorded.sale)
        .await;
    uow.rollback().await.unwrap();

    assert!(matches!(result, Err(LedgerError::NotFound { entity: "sale", .. })));

    cleanup(&db, tenant_id).await;
    cleanup(&db, other_tenant).await;
}

#[tokio::test]
async fn test_sale_for_unknown_member_is_rejected() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let product = create_product(&db, tenant_id, dec!(5000), None, 2).await;

    let missing = Uuid::now_v7();
    let result = SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: Some(missing),
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 1)],
                amount_paid: dec!(5000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await;

    assert!(matches!(result, Err(EventError::MemberNotFound(id)) if id == missing));
    assert_eq!(row_counts(&db, tenant_id).await.sales, 0);

    cleanup(&db, tenant_id).await;
}

#[tokio::test]
async fn test_cleanup_removes_a_tenant_with_postings() {
    let Some(db) = connect().await else { return };
    let tenant_id = create_seeded_tenant(&db).await;
    let member = create_member(&db, tenant_id).await;
    let product = create_product(&db, tenant_id, dec!(10000), Some(dec!(8000)), 5).await;

    DepositService::new(db.clone(), settings())
        .record_deposit(
            tenant_id,
            Uuid::now_v7(),
            NewDeposit {
                member_id: member.id,
                category: DepositCategory::Principal,
                amount: dec!(100000),
                deposit_date: Some(date(2025, 1, 16)),
                note: None,
            },
        )
        .await
        .expect("deposit failed");
    SaleService::new(db.clone(), settings())
        .process_sale(
            tenant_id,
            Uuid::now_v7(),
            NewSale {
                member_id: Some(member.id),
                sale_date: Some(date(2025, 1, 16)),
                items: vec![item(&product, 2)],
                amount_paid: dec!(20000),
                payment_method: PaymentMethod::Cash,
                note: None,
            },
        )
        .await
        .expect("sale failed");
    assert_eq!(row_counts(&db, tenant_id).await.journal_lines, 6);

    cleanup(&db, tenant_id).await;

    assert!(
        cooperatives::Entity::find_by_id(tenant_id)
            .one(&db)
            .await
            .unwrap()
            .is_none()
    );
    let remaining_accounts = accounts::Entity::find()
        .filter(accounts::Column::TenantId.eq(tenant_id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(remaining_accounts, 0);
    assert_eq!(
        row_counts(&db, tenant_id).await,
        RowCounts {
            sales: 0,
            sale_items: 0,
            deposits: 0,
            journal_entries: 0,
            journal_lines: 0,
        }
    );
}
