//! Point-of-sale sale handler.
//!
//! [`SaleService::process_sale`] is the outermost caller of
//! [`PostingEngine::post_sale`]: the sale row, its items, the stock movement,
//! and the journal entry commit in one unit of work.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DatabaseTransaction, Set};
use tracing::info;
use uuid::Uuid;

use koperasi_core::events::{EventError, PaymentMethod, SaleDraft, SaleItemInput};
use koperasi_core::sequence::SequenceScope;
use koperasi_shared::LedgerConfig;

use super::inventory::InventoryRepository;
use super::member::MemberService;
use super::posting::{JournalEntryWithLines, PostingEngine};
use super::sequence::SequenceGenerator;
use crate::entities::{sale_items, sales};
use crate::error::DbResultExt;
use crate::unit_of_work::UnitOfWorkExt;

/// Input for recording a sale.
#[derive(Debug, Clone)]
pub struct NewSale {
    /// Buying member, if any.
    pub member_id: Option<Uuid>,
    /// Sale date; today's business date when omitted.
    pub sale_date: Option<NaiveDate>,
    /// Items sold.
    pub items: Vec<SaleItemInput>,
    /// Amount tendered.
    pub amount_paid: Decimal,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Free-form note.
    pub note: Option<String>,
}

/// A recorded sale with its items and journal entry.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    /// The sale, linked to its journal entry.
    pub sale: sales::Model,
    /// Items with the product name and cost captured at sale time.
    pub items: Vec<sale_items::Model>,
    /// The posted journal entry.
    pub journal: JournalEntryWithLines,
}

/// Sale service owning the unit of work for sales.
#[derive(Debug, Clone)]
pub struct SaleService {
    db: DatabaseConnection,
    engine: PostingEngine,
    settings: LedgerConfig,
}

impl SaleService {
    /// Creates a new sale service.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerConfig) -> Self {
        let engine = PostingEngine::new(SequenceGenerator::new(settings.sequence_retry_attempts));
        Self {
            db,
            engine,
            settings,
        }
    }

    /// Records a sale, moves stock, and posts it to the journal.
    ///
    /// Any failure rolls back every row written for the sale.
    ///
    /// # Errors
    ///
    /// Returns an [`EventError`] for invalid input, unknown products or
    /// members, insufficient stock, or a failed posting.
    pub async fn process_sale(
        &self,
        tenant_id: Uuid,
        cashier_id: Uuid,
        input: NewSale,
    ) -> Result<SaleWithItems, EventError> {
        let draft = SaleDraft::new(input.items.clone(), input.amount_paid)?;
        let sale_date = input.sale_date.unwrap_or_else(|| self.settings.today());

        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let result = self
            .record(uow.transaction(), tenant_id, cashier_id, sale_date, &input, &draft)
            .await;
        let recorded = uow.complete(result).await?;

        info!(
            tenant_id = %tenant_id,
            sale_number = %recorded.sale.sale_number,
            journal_number = %recorded.journal.entry.journal_number,
            total = %recorded.sale.total,
            "Sale recorded"
        );
        Ok(recorded)
    }

    async fn record(
        &self,
        txn: &DatabaseTransaction,
        tenant_id: Uuid,
        cashier_id: Uuid,
        sale_date: NaiveDate,
        input: &NewSale,
        draft: &SaleDraft,
    ) -> Result<SaleWithItems, EventError> {
        if let Some(member_id) = input.member_id {
            MemberService::find_member(txn, tenant_id, member_id)
                .await?
                .ok_or(EventError::MemberNotFound(member_id))?;
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut sale = self
            .engine
            .sequences()
            .insert_with_code(txn, tenant_id, SequenceScope::Sale, sale_date, |sale_number| {
                sales::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    tenant_id: Set(tenant_id),
                    sale_number: Set(sale_number),
                    sale_date: Set(sale_date),
                    member_id: Set(input.member_id),
                    total: Set(draft.total()),
                    payment_method: Set(input.payment_method.into()),
                    amount_paid: Set(draft.amount_paid()),
                    change_due: Set(draft.change()),
                    cashier_id: Set(cashier_id),
                    journal_entry_id: Set(None),
                    note: Set(input.note.clone()),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
            })
            .await?;

        let mut items = Vec::with_capacity(draft.items().len());
        for item in draft.items() {
            let product_id = item.product_id.into_inner();
            let product = InventoryRepository::find_product(txn, tenant_id, product_id).await?;

            let saved = sale_items::ActiveModel {
                id: Set(Uuid::now_v7()),
                sale_id: Set(sale.id),
                product_id: Set(product_id),
                product_name: Set(product.name),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                subtotal: Set(item.subtotal),
                unit_cost: Set(product.purchase_price),
                created_at: Set(now),
            }
            .insert(txn)
            .await
            .step("insert sale item")?;
            items.push(saved);

            InventoryRepository::decrement_stock(txn, tenant_id, product_id, item.quantity).await?;
        }

        let journal = self
            .engine
            .post_sale(txn, tenant_id, cashier_id, &sale)
            .await?;
        sale.journal_entry_id = Some(journal.entry.id);

        Ok(SaleWithItems {
            sale,
            items,
            journal,
        })
    }
}
