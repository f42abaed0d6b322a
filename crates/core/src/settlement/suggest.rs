//! Greedy minimal-transfer suggestions.

use rust_decimal::Decimal;

use super::types::{NetBalance, TransferSuggestion};
use crate::money::{is_negligible, round2};

/// Proposes transfers that zero out the given net balances.
///
/// Greedy matching: the largest debtor always pays the largest creditor the
/// smaller of their two outstanding amounts. This is a simplified
/// min-cash-flow heuristic - deterministic given sorted input and minimal for
/// the common few-party case, but NOT guaranteed to be the theoretical
/// minimum transfer count in all cases. It emits at most
/// `creditors + debtors - 1` transfers.
///
/// Residue below one cent is treated as zero.
#[must_use]
pub fn suggest_transfers(balances: &[NetBalance]) -> Vec<TransferSuggestion> {
    // Sub-cent balances are residue, not debt; dropping them here also keeps
    // every amount at 2dp so the arithmetic below is exact.
    let mut creditors: Vec<NetBalance> = balances
        .iter()
        .filter(|n| n.amount > Decimal::ZERO && !is_negligible(n.amount))
        .map(|n| NetBalance {
            member_id: n.member_id,
            amount: round2(n.amount),
        })
        .collect();
    let mut debtors: Vec<NetBalance> = balances
        .iter()
        .filter(|n| n.amount < Decimal::ZERO && !is_negligible(n.amount))
        .map(|n| NetBalance {
            member_id: n.member_id,
            amount: round2(-n.amount),
        })
        .collect();

    creditors.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.member_id.cmp(&b.member_id)));
    debtors.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.member_id.cmp(&b.member_id)));

    let mut transfers = Vec::new();
    let (mut ci, mut di) = (0, 0);

    while ci < creditors.len() && di < debtors.len() {
        let amount = creditors[ci].amount.min(debtors[di].amount);

        transfers.push(TransferSuggestion {
            debtor_id: debtors[di].member_id,
            creditor_id: creditors[ci].member_id,
            amount,
        });

        creditors[ci].amount = round2(creditors[ci].amount - amount);
        debtors[di].amount = round2(debtors[di].amount - amount);

        if is_negligible(creditors[ci].amount) {
            ci += 1;
        }
        if is_negligible(debtors[di].amount) {
            di += 1;
        }
    }

    transfers
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn bal(member_id: Uuid, amount: Decimal) -> NetBalance {
        NetBalance { member_id, amount }
    }

    #[test]
    fn test_two_party() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let transfers = suggest_transfers(&[bal(a, dec!(30)), bal(b, dec!(-30))]);

        assert_eq!(
            transfers,
            vec![TransferSuggestion {
                debtor_id: b,
                creditor_id: a,
                amount: dec!(30),
            }]
        );
    }

    #[test]
    fn test_one_debtor_two_creditors() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let transfers =
            suggest_transfers(&[bal(a, dec!(50)), bal(b, dec!(20)), bal(c, dec!(-70))]);

        assert_eq!(transfers.len(), 2);
        assert_eq!(transfers[0].creditor_id, a);
        assert_eq!(transfers[0].amount, dec!(50));
        assert_eq!(transfers[1].creditor_id, b);
        assert_eq!(transfers[1].amount, dec!(20));
        assert!(transfers.iter().all(|t| t.debtor_id == c));
    }

    #[test]
    fn test_transfers_zero_all_balances() {
        let (a, b, c, d) = (
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        let balances = [
            bal(a, dec!(42.10)),
            bal(b, dec!(7.90)),
            bal(c, dec!(-30.00)),
            bal(d, dec!(-20.00)),
        ];
        let transfers = suggest_transfers(&balances);

        let mut after: std::collections::HashMap<Uuid, Decimal> =
            balances.iter().map(|n| (n.member_id, n.amount)).collect();
        for t in &transfers {
            *after.get_mut(&t.debtor_id).unwrap() += t.amount;
            *after.get_mut(&t.creditor_id).unwrap() -= t.amount;
        }

        for (_, amount) in after {
            assert_eq!(amount, Decimal::ZERO);
        }
    }

    #[test]
    fn test_empty_and_all_zero_input() {
        assert!(suggest_transfers(&[]).is_empty());
        let a = Uuid::new_v4();
        assert!(suggest_transfers(&[bal(a, dec!(0))]).is_empty());
    }

    #[test]
    fn test_sub_cent_residue_dropped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let transfers = suggest_transfers(&[bal(a, dec!(0.005)), bal(b, dec!(-0.005))]);
        assert!(transfers.is_empty());
    }

    #[test]
    fn test_deterministic_for_equal_amounts() {
        let mut ids = [Uuid::new_v4(), Uuid::new_v4()];
        ids.sort();
        let (a, b) = (ids[0], ids[1]);
        let c = Uuid::new_v4();

        let first = suggest_transfers(&[bal(a, dec!(10)), bal(b, dec!(10)), bal(c, dec!(-20))]);
        let second = suggest_transfers(&[bal(b, dec!(10)), bal(a, dec!(10)), bal(c, dec!(-20))]);

        assert_eq!(first, second);
        assert_eq!(first[0].creditor_id, a);
    }
}
