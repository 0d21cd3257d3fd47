//! `SeaORM` Entity for members table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub member_number: String,
    pub full_name: String,
    pub joined_on: Date,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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
    #[sea_orm(has_many = "super::deposits::Entity")]
    Deposits,
}

impl Related<super::cooperatives::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cooperatives.def()
    }
}

impl Related<super::deposits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Deposits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
