//! Settlement domain types.
//!
//! These are the shapes the settlement calculations operate on. Raw persisted
//! records are converted into these types at the repository boundary; the
//! calculations themselves never see a database row.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification of an expense entry.
///
/// Only expense entries may carry splits; income entries never produce debt
/// edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Money spent - may be split across members.
    Expense,
    /// Money received - never split.
    Income,
}

/// One proposed share of an expense, as received at the API boundary.
///
/// Fields are optional because the input is untrusted; the validator turns
/// missing pieces into explicit errors instead of defaulting them.
#[derive(Debug, Clone, Deserialize)]
pub struct SplitInput {
    /// The member who owes this share.
    pub debtor_id: Option<Uuid>,
    /// The share amount.
    pub amount: Decimal,
}

/// A raw debt edge as fetched from persistence, before defensive filtering.
#[derive(Debug, Clone)]
pub struct RawSplit {
    /// Split record id.
    pub split_id: Uuid,
    /// Owning expense entry id.
    pub entry_id: Uuid,
    /// Calendar date of the owning entry.
    pub entry_date: NaiveDate,
    /// The member who paid the expense.
    pub creditor_id: Uuid,
    /// The member who owes this share.
    pub debtor_id: Uuid,
    /// The obligated share amount.
    pub amount: Decimal,
}

/// A debt edge with its settled and remaining amounts for a period.
#[derive(Debug, Clone, Serialize)]
pub struct SplitLine {
    /// Split record id.
    pub split_id: Uuid,
    /// Owning expense entry id.
    pub entry_id: Uuid,
    /// Calendar date of the owning entry.
    pub entry_date: NaiveDate,
    /// The member who paid the expense.
    pub creditor_id: Uuid,
    /// The member who owes this share.
    pub debtor_id: Uuid,
    /// The obligated share amount.
    pub amount: Decimal,
    /// Sum of settlement items recorded against this split in the period.
    pub settled: Decimal,
    /// `max(0, amount - settled)`, rounded.
    pub remaining: Decimal,
}

/// Signed net position of one member across all remaining debt edges.
///
/// Positive = net receivable, negative = net payable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetBalance {
    /// The member.
    pub member_id: Uuid,
    /// The signed net amount.
    pub amount: Decimal,
}

/// One proposed transfer that helps zero out the net balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferSuggestion {
    /// The member who pays.
    pub debtor_id: Uuid,
    /// The member who receives.
    pub creditor_id: Uuid,
    /// The transfer amount.
    pub amount: Decimal,
}

/// Allocation of part of a settlement against one specific split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// The target split.
    pub split_id: Uuid,
    /// The amount settled against it.
    pub amount: Decimal,
}
