//! Member registration and lookup.

use chrono::{NaiveDate, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::info;
use uuid::Uuid;

use koperasi_core::ledger::LedgerError;
use koperasi_core::sequence::SequenceScope;
use koperasi_shared::LedgerConfig;

use super::sequence::SequenceGenerator;
use crate::entities::members;
use crate::error::DbResultExt;
use crate::unit_of_work::UnitOfWorkExt;

/// Input for registering a member.
#[derive(Debug, Clone)]
pub struct NewMember {
    /// Member's full name.
    pub full_name: String,
    /// Join date; today's business date when omitted. Its year picks the
    /// member number bucket.
    pub joined_on: Option<NaiveDate>,
}

/// Member service owning the unit of work for registrations.
#[derive(Debug, Clone)]
pub struct MemberService {
    db: DatabaseConnection,
    sequences: SequenceGenerator,
    settings: LedgerConfig,
}

impl MemberService {
    /// Creates a new member service.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerConfig) -> Self {
        Self {
            db,
            sequences: SequenceGenerator::new(settings.sequence_retry_attempts),
            settings,
        }
    }

    /// Registers a member under the next `KOOP-YYYY-NNNN` number.
    ///
    /// # Errors
    ///
    /// Returns a sequence or database error.
    pub async fn register_member(
        &self,
        tenant_id: Uuid,
        input: NewMember,
    ) -> Result<members::Model, LedgerError> {
        let joined_on = input.joined_on.unwrap_or_else(|| self.settings.today());
        let now: DateTimeWithTimeZone = Utc::now().into();

        let uow = self
            .db
            .unit_of_work(&self.settings)
            .await
            .step("begin unit of work")?;
        let result = self
            .sequences
            .insert_with_code(
                uow.transaction(),
                tenant_id,
                SequenceScope::Member,
                joined_on,
                |member_number| members::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    tenant_id: Set(tenant_id),
                    member_number: Set(member_number),
                    full_name: Set(input.full_name.clone()),
                    joined_on: Set(joined_on),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                },
            )
            .await;
        let member = uow.complete(result).await?;

        info!(
            tenant_id = %tenant_id,
            code = %member.member_number,
            "Member registered"
        );
        Ok(member)
    }

    /// Finds a member owned by the tenant.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_member<C>(
        conn: &C,
        tenant_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<members::Model>, LedgerError>
    where
        C: ConnectionTrait,
    {
        members::Entity::find_by_id(member_id)
            .filter(members::Column::TenantId.eq(tenant_id))
            .one(conn)
            .await
            .step("load member")
    }
}
