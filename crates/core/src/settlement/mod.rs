//! Debt settlement calculation.
//!
//! This module implements the settlement core:
//! - Split validation before an expense is persisted
//! - Assembly of debt edges (split lines) net of recorded settlements
//! - Net balance aggregation per member
//! - Greedy minimal-transfer suggestions
//! - FIFO allocation of a payment across a debtor/creditor pair's edges
//! - Draft batch planning and the draft note-prefix convention

pub mod allocate;
pub mod draft;
pub mod error;
pub mod lines;
pub mod net;
pub mod suggest;
pub mod types;
pub mod validate;

#[cfg(test)]
mod props;

pub use allocate::allocate_fifo;
pub use draft::{DraftPlan, apply_draft_prefix, is_draft_note, plan_drafts, strip_draft_prefix};
pub use error::SettlementError;
pub use lines::build_split_lines;
pub use net::net_balances;
pub use suggest::suggest_transfers;
pub use types::{
    Allocation, EntryKind, NetBalance, RawSplit, SplitInput, SplitLine, TransferSuggestion,
};
pub use validate::validate_split;
