//! Net balance aggregation per member.

use std::collections::HashMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{NetBalance, SplitLine};
use crate::money::round2;

/// Aggregates remaining debt edges into one signed net balance per member.
///
/// Each edge adds its remaining amount to the creditor and subtracts it from
/// the debtor, every accumulation passing through rounding. Members who net
/// to exactly zero are omitted; callers must not rely on their absence.
///
/// Output is sorted descending by amount (receivables first), member id as a
/// deterministic tie-break. The amounts always sum to zero.
#[must_use]
pub fn net_balances(lines: &[SplitLine]) -> Vec<NetBalance> {
    let mut totals: HashMap<Uuid, Decimal> = HashMap::new();

    for line in lines.iter().filter(|l| l.remaining > Decimal::ZERO) {
        let credit = totals.entry(line.creditor_id).or_default();
        *credit = round2(*credit + line.remaining);
        let debit = totals.entry(line.debtor_id).or_default();
        *debit = round2(*debit - line.remaining);
    }

    let mut balances: Vec<NetBalance> = totals
        .into_iter()
        .filter(|(_, amount)| *amount != Decimal::ZERO)
        .map(|(member_id, amount)| NetBalance { member_id, amount })
        .collect();

    balances.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.member_id.cmp(&b.member_id)));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn edge(creditor: Uuid, debtor: Uuid, remaining: Decimal) -> SplitLine {
        SplitLine {
            split_id: Uuid::new_v4(),
            entry_id: Uuid::new_v4(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            creditor_id: creditor,
            debtor_id: debtor,
            amount: remaining,
            settled: Decimal::ZERO,
            remaining,
        }
    }

    #[test]
    fn test_single_edge() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let balances = net_balances(&[edge(a, b, dec!(30))]);

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0], NetBalance { member_id: a, amount: dec!(30.00) });
        assert_eq!(balances[1], NetBalance { member_id: b, amount: dec!(-30.00) });
    }

    #[test]
    fn test_opposing_edges_cancel() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let balances = net_balances(&[edge(a, b, dec!(30)), edge(b, a, dec!(30))]);
        assert!(balances.is_empty());
    }

    #[test]
    fn test_zero_sum() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let balances = net_balances(&[
            edge(a, b, dec!(25.50)),
            edge(a, c, dec!(10.25)),
            edge(c, b, dec!(4.75)),
        ]);

        let total: Decimal = balances.iter().map(|n| n.amount).sum();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_ignores_fully_settled_edges() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut settled = edge(a, b, dec!(30));
        settled.settled = dec!(30);
        settled.remaining = Decimal::ZERO;

        assert!(net_balances(&[settled]).is_empty());
    }

    #[test]
    fn test_sorted_receivables_first() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let balances = net_balances(&[edge(a, c, dec!(50)), edge(b, c, dec!(20))]);

        assert_eq!(balances[0].amount, dec!(50.00));
        assert_eq!(balances[1].amount, dec!(20.00));
        assert_eq!(balances[2].amount, dec!(-70.00));
    }
}
