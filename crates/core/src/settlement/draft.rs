//! Draft batch planning and the draft note-prefix convention.
//!
//! A draft settlement is an ordinary settlement header whose note starts with
//! a reserved prefix. Confirming a draft strips the prefix and changes
//! nothing else; the prefix itself is configuration, not a literal baked into
//! the settlement code.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{Allocation, SplitLine};
use crate::money::round2;

/// One proposed settlement covering every remaining edge of a
/// debtor/creditor pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPlan {
    /// The member who pays.
    pub debtor_id: Uuid,
    /// The member who receives.
    pub creditor_id: Uuid,
    /// Sum of the item amounts.
    pub total: Decimal,
    /// One allocation per underlying split, full remaining each.
    pub items: Vec<Allocation>,
}

/// Groups all remaining edges by debtor/creditor pair into draft plans.
///
/// Each plan settles its pair's edges in full. Pairs come out in a
/// deterministic order (sorted by debtor then creditor id); fully settled
/// edges produce no plan.
#[must_use]
pub fn plan_drafts(lines: &[SplitLine]) -> Vec<DraftPlan> {
    let mut groups: BTreeMap<(Uuid, Uuid), Vec<&SplitLine>> = BTreeMap::new();
    for line in lines.iter().filter(|l| l.remaining > Decimal::ZERO) {
        groups
            .entry((line.debtor_id, line.creditor_id))
            .or_default()
            .push(line);
    }

    groups
        .into_iter()
        .map(|((debtor_id, creditor_id), edges)| {
            let items: Vec<Allocation> = edges
                .iter()
                .map(|l| Allocation {
                    split_id: l.split_id,
                    amount: l.remaining,
                })
                .collect();
            let total = round2(items.iter().map(|i| i.amount).sum::<Decimal>());
            DraftPlan {
                debtor_id,
                creditor_id,
                total,
                items,
            }
        })
        .collect()
}

/// Marks a settlement note as a draft.
#[must_use]
pub fn apply_draft_prefix(prefix: &str, note: &str) -> String {
    format!("{prefix}{note}")
}

/// Returns true if the note carries the draft marker.
#[must_use]
pub fn is_draft_note(prefix: &str, note: &str) -> bool {
    !prefix.is_empty() && note.starts_with(prefix)
}

/// Strips the draft marker, promoting the note to confirmed.
///
/// Returns `None` if the note is not a draft.
#[must_use]
pub fn strip_draft_prefix(prefix: &str, note: &str) -> Option<String> {
    if is_draft_note(prefix, note) {
        Some(note[prefix.len()..].to_string())
    } else {
        None
    }
}
