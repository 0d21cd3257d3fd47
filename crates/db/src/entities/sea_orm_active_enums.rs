//! `SeaORM` active enums backed by `PostgreSQL` enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use koperasi_core::{events, ledger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "normal_side")]
pub enum NormalSide {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_category")]
pub enum JournalCategory {
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "deposit_category")]
pub enum DepositCategory {
    #[sea_orm(string_value = "principal")]
    Principal,
    #[sea_orm(string_value = "mandatory")]
    Mandatory,
    #[sea_orm(string_value = "voluntary")]
    Voluntary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
}

impl From<ledger::AccountType> for AccountType {
    fn from(value: ledger::AccountType) -> Self {
        match value {
            ledger::AccountType::Asset => Self::Asset,
            ledger::AccountType::Liability => Self::Liability,
            ledger::AccountType::Equity => Self::Equity,
            ledger::AccountType::Revenue => Self::Revenue,
            ledger::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountType> for ledger::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<ledger::NormalSide> for NormalSide {
    fn from(value: ledger::NormalSide) -> Self {
        match value {
            ledger::NormalSide::Debit => Self::Debit,
            ledger::NormalSide::Credit => Self::Credit,
        }
    }
}

impl From<NormalSide> for ledger::NormalSide {
    fn from(value: NormalSide) -> Self {
        match value {
            NormalSide::Debit => Self::Debit,
            NormalSide::Credit => Self::Credit,
        }
    }
}

impl From<ledger::JournalCategory> for JournalCategory {
    fn from(value: ledger::JournalCategory) -> Self {
        match value {
            ledger::JournalCategory::Sale => Self::Sale,
            ledger::JournalCategory::Deposit => Self::Deposit,
            ledger::JournalCategory::Manual => Self::Manual,
            ledger::JournalCategory::Reversal => Self::Reversal,
        }
    }
}

impl From<events::DepositCategory> for DepositCategory {
    fn from(value: events::DepositCategory) -> Self {
        match value {
            events::DepositCategory::Principal => Self::Principal,
            events::DepositCategory::Mandatory => Self::Mandatory,
            events::DepositCategory::Voluntary => Self::Voluntary,
        }
    }
}

impl From<DepositCategory> for events::DepositCategory {
    fn from(value: DepositCategory) -> Self {
        match value {
            DepositCategory::Principal => Self::Principal,
            DepositCategory::Mandatory => Self::Mandatory,
            DepositCategory::Voluntary => Self::Voluntary,
        }
    }
}

impl From<events::PaymentMethod> for PaymentMethod {
    fn from(value: events::PaymentMethod) -> Self {
        match value {
            events::PaymentMethod::Cash => Self::Cash,
        }
    }
}
