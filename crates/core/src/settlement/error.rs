//! Settlement error types.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during settlement calculations and validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettlementError {
    // ========== Split Validation Errors ==========
    /// Only expense entries may be split.
    #[error("Only expense entries can be split")]
    NotAnExpense,

    /// A split requires a payer.
    #[error("A split expense requires a payer")]
    MissingPayer,

    /// A split line has no debtor.
    #[error("Every split line requires a debtor")]
    MissingDebtor,

    /// A member cannot owe themselves.
    #[error("Member {0} cannot owe themselves")]
    SelfDebt(Uuid),

    /// A split line amount must be positive.
    #[error("Split amount must be positive, got {0}")]
    NonPositiveShare(Decimal),

    /// The shares exceed the expense total.
    #[error("Split shares ({shares}) exceed the expense total ({total})")]
    SharesExceedTotal {
        /// Sum of the proposed shares.
        shares: Decimal,
        /// Total amount of the expense.
        total: Decimal,
    },

    // ========== Settlement Amount Errors ==========
    /// A settlement amount must be positive.
    #[error("Settlement amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// The requested amount exceeds the remaining balance.
    ///
    /// The maximum allowed amount is included so the caller can retry
    /// without re-querying.
    #[error("Requested {requested} exceeds the remaining balance; at most {available} can be settled")]
    OverSettlement {
        /// The amount the caller asked to settle.
        requested: Decimal,
        /// The maximum the caller could settle right now.
        available: Decimal,
    },
}

impl SettlementError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotAnExpense => "NOT_AN_EXPENSE",
            Self::MissingPayer => "MISSING_PAYER",
            Self::MissingDebtor => "MISSING_DEBTOR",
            Self::SelfDebt(_) => "SELF_DEBT",
            Self::NonPositiveShare(_) => "NON_POSITIVE_SHARE",
            Self::SharesExceedTotal { .. } => "SHARES_EXCEED_TOTAL",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::OverSettlement { .. } => "OVER_SETTLEMENT",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Every variant is a rule violation reported to the caller, never a
    /// server fault.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        400
    }
}
