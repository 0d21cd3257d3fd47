//! `SeaORM` Entity for journal_entries table.

use super::sea_orm_active_enums::JournalCategory;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub journal_number: String,
    pub entry_date: Date,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub reference: Option<String>,
    pub category: JournalCategory,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_credit: Decimal,
    pub is_balanced: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cooperatives::Entity",
        from = "Column::TenantId",
        to = "super::cooperatives::Column::Id",
        on_delete = "Cascade"
    )]
    Cooperatives,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
