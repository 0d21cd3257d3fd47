//! `SeaORM` entity definitions.

pub mod accounts;
pub mod cooperatives;
pub mod deposits;
pub mod journal_entries;
pub mod journal_lines;
pub mod members;
pub mod products;
pub mod sale_items;
pub mod sales;
pub mod sea_orm_active_enums;
