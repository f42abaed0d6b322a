//! Core settlement logic for Hearthbook.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here.
//!
//! # Modules
//!
//! - `money` - Monetary rounding and boundary coercion
//! - `settlement` - Debt edges, net balances, transfer suggestions,
//!   FIFO allocation, and draft planning

pub mod money;
pub mod settlement;
