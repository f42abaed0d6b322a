//! `SeaORM` entity definitions.

pub mod expense_entries;
pub mod expense_splits;
pub mod households;
pub mod members;
pub mod settlement_headers;
pub mod settlement_items;

pub use expense_entries::EntryType;
