//! Shared types and configuration for Hearthbook.
//!
//! This crate holds the pieces every other crate needs: application
//! configuration and the `Period` date-range type used to scope settlement
//! queries.

pub mod config;
pub mod period;

pub use config::{AppConfig, DatabaseConfig, ServerConfig, SettlementConfig};
pub use period::{Period, PeriodError};
