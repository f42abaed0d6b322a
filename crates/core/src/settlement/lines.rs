//! Assembly of split lines from raw persisted records.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{RawSplit, SplitLine};
use crate::money::round2;

/// Builds the period's split lines from raw debt edges and the settled
/// amounts already recorded against them.
///
/// Upstream data is not trusted blindly: self-edges and non-positive amounts
/// are discarded here even though the validator should have prevented them at
/// write time. `settled_by_split` maps `split_id` to the summed settlement
/// item amounts for the same period.
///
/// Output is sorted ascending by entry date with the original fetch order as
/// a stable tie-break.
#[must_use]
pub fn build_split_lines(
    raw: Vec<RawSplit>,
    settled_by_split: &HashMap<Uuid, Decimal>,
) -> Vec<SplitLine> {
    let mut lines: Vec<SplitLine> = raw
        .into_iter()
        .filter(|s| s.creditor_id != s.debtor_id && s.amount > Decimal::ZERO)
        .map(|s| {
            let amount = round2(s.amount);
            let settled = round2(
                settled_by_split
                    .get(&s.split_id)
                    .copied()
                    .unwrap_or(Decimal::ZERO),
            );
            let remaining = round2((amount - settled).max(Decimal::ZERO));
            SplitLine {
                split_id: s.split_id,
                entry_id: s.entry_id,
                entry_date: s.entry_date,
                creditor_id: s.creditor_id,
                debtor_id: s.debtor_id,
                amount,
                settled,
                remaining,
            }
        })
        .collect();

    lines.sort_by_key(|l| l.entry_date);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn raw(date: &str, amount: Decimal) -> RawSplit {
        RawSplit {
            split_id: Uuid::new_v4(),
            entry_id: Uuid::new_v4(),
            entry_date: d(date),
            creditor_id: Uuid::new_v4(),
            debtor_id: Uuid::new_v4(),
            amount,
        }
    }

    #[test]
    fn test_remaining_subtracts_settled() {
        let split = raw("2024-01-10", dec!(30));
        let id = split.split_id;
        let settled = HashMap::from([(id, dec!(20))]);

        let lines = build_split_lines(vec![split], &settled);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].settled, dec!(20.00));
        assert_eq!(lines[0].remaining, dec!(10.00));
    }

    #[test]
    fn test_remaining_floors_at_zero() {
        // Settled more than owed can only come from bad upstream data;
        // remaining must still never go negative.
        let split = raw("2024-01-10", dec!(30));
        let id = split.split_id;
        let settled = HashMap::from([(id, dec!(45))]);

        let lines = build_split_lines(vec![split], &settled);
        assert_eq!(lines[0].remaining, dec!(0.00));
    }

    #[test]
    fn test_discards_self_edges_and_non_positive() {
        let member = Uuid::new_v4();
        let mut self_edge = raw("2024-01-10", dec!(10));
        self_edge.creditor_id = member;
        self_edge.debtor_id = member;
        let zero = raw("2024-01-11", dec!(0));
        let negative = raw("2024-01-12", dec!(-5));
        let good = raw("2024-01-13", dec!(5));

        let lines = build_split_lines(vec![self_edge, zero, negative, good], &HashMap::new());

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, dec!(5.00));
    }

    #[test]
    fn test_sorted_by_date_with_stable_tie_break() {
        let a = raw("2024-01-20", dec!(1));
        let b = raw("2024-01-10", dec!(2));
        let c = raw("2024-01-10", dec!(3));
        let (b_id, c_id) = (b.split_id, c.split_id);

        let lines = build_split_lines(vec![a, b, c], &HashMap::new());

        assert_eq!(lines[0].split_id, b_id);
        assert_eq!(lines[1].split_id, c_id);
        assert_eq!(lines[2].entry_date, d("2024-01-20"));
    }

    #[test]
    fn test_unsettled_split_has_full_remaining() {
        let lines = build_split_lines(vec![raw("2024-01-10", dec!(12.34))], &HashMap::new());
        assert_eq!(lines[0].settled, dec!(0.00));
        assert_eq!(lines[0].remaining, dec!(12.34));
    }
}
