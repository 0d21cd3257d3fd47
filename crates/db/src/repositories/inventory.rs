//! Stock bookkeeping for sold products.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use tracing::debug;
use uuid::Uuid;

use koperasi_core::events::EventError;

use crate::entities::products;
use crate::error::DbResultExt;

/// Product lookups and stock movement inside the caller's transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryRepository;

impl InventoryRepository {
    /// Finds a product owned by the tenant.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::ProductNotFound`] if the product is missing or
    /// owned by another tenant.
    pub async fn find_product<C>(
        conn: &C,
        tenant_id: Uuid,
        product_id: Uuid,
    ) -> Result<products::Model, EventError>
    where
        C: ConnectionTrait,
    {
        let product = products::Entity::find_by_id(product_id)
            .filter(products::Column::TenantId.eq(tenant_id))
            .one(conn)
            .await
            .step("load product")?
            .ok_or(EventError::ProductNotFound(product_id))?;

        Ok(product)
    }

    /// Removes `quantity` units from stock.
    ///
    /// The check and the update are one conditional statement, so two sales
    /// can never both take the last unit.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::InsufficientStock`] if fewer than `quantity`
    /// units remain, or [`EventError::ProductNotFound`].
    pub async fn decrement_stock<C>(
        conn: &C,
        tenant_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), EventError>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = products::Entity::update_many()
            .col_expr(
                products::Column::Stock,
                Expr::col(products::Column::Stock).sub(quantity),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(product_id))
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::Stock.gte(quantity))
            .exec(conn)
            .await
            .step("decrement stock")?;

        if result.rows_affected == 0 {
            let product = Self::find_product(conn, tenant_id, product_id).await?;
            return Err(EventError::InsufficientStock {
                product_id,
                available: product.stock,
                requested: quantity,
            });
        }

        debug!(
            tenant_id = %tenant_id,
            product_id = %product_id,
            quantity,
            "Stock decremented"
        );
        Ok(())
    }
}
