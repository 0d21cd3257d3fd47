//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Lookups and posting steps take the caller's connection or transaction;
//! the services own the unit of work.

pub mod account;
pub mod balance;
pub mod deposit;
pub mod inventory;
pub mod journal;
pub mod member;
pub mod posting;
pub mod sale;
pub mod sequence;

pub use account::{AccountError, ChartOfAccounts, CreateAccountInput};
pub use balance::{AccountLedger, BalanceCalculator};
pub use deposit::{DepositService, DepositWithJournal, NewDeposit};
pub use inventory::InventoryRepository;
pub use journal::{JournalService, NewJournalEntry};
pub use member::{MemberService, NewMember};
pub use posting::{JournalEntryWithLines, PostingEngine};
pub use sale::{NewSale, SaleService, SaleWithItems};
pub use sequence::SequenceGenerator;
