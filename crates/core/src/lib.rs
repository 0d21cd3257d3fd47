//! Core ledger logic for the cooperative ERP.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Double-entry validation, balances, and posting line builders
//! - `sequence` - Human-readable reference code formatting and parsing
//! - `events` - Sale and deposit drafts that trigger postings

pub mod events;
pub mod ledger;
pub mod sequence;
