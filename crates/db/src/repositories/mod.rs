//! Repository abstractions for data access.

pub mod expense;
pub mod household;
pub mod settlement;

pub use expense::ExpenseRepository;
pub use household::HouseholdRepository;
pub use settlement::SettlementRepository;
