//! Property tests for the settlement calculations.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::allocate::allocate_fifo;
use super::net::net_balances;
use super::suggest::suggest_transfers;
use super::types::SplitLine;
use crate::money::round2;

/// Strategy for positive 2dp monetary amounts.
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for arbitrary finite decimals of varying scale.
fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..12u32).prop_map(|(n, scale)| Decimal::new(n, scale))
}

/// Strategy for a pool of distinct member ids.
fn member_pool() -> Vec<Uuid> {
    (0..5).map(|_| Uuid::new_v4()).collect()
}

/// Strategy for lists of debt edges over a small member pool.
fn edges_strategy() -> impl Strategy<Value = Vec<SplitLine>> {
    let pool = member_pool();
    prop::collection::vec(
        (0usize..5usize, 0usize..5usize, amount_strategy(), 1u32..28u32),
        0..20,
    )
    .prop_map(move |raw| {
        raw.into_iter()
            .filter(|(c, d, _, _)| c != d)
            .map(|(c, d, amount, day)| SplitLine {
                split_id: Uuid::new_v4(),
                entry_id: Uuid::new_v4(),
                entry_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                creditor_id: pool[c],
                debtor_id: pool[d],
                amount,
                settled: Decimal::ZERO,
                remaining: amount,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Rounding to 2dp is idempotent for any finite input.
    #[test]
    fn prop_round2_idempotent(v in decimal_strategy()) {
        prop_assert_eq!(round2(round2(v)), round2(v));
    }

    /// Net balances always sum to exactly zero.
    #[test]
    fn prop_net_balances_zero_sum(edges in edges_strategy()) {
        let balances = net_balances(&edges);
        let total: Decimal = balances.iter().map(|n| n.amount).sum();
        prop_assert_eq!(total, Decimal::ZERO);
    }

    /// Applying every suggested transfer drives every balance to exactly zero.
    #[test]
    fn prop_suggested_transfers_zero_balances(edges in edges_strategy()) {
        let balances = net_balances(&edges);
        let transfers = suggest_transfers(&balances);

        let mut after: std::collections::HashMap<Uuid, Decimal> =
            balances.iter().map(|n| (n.member_id, n.amount)).collect();
        for t in &transfers {
            prop_assert!(t.amount > Decimal::ZERO);
            prop_assert_ne!(t.debtor_id, t.creditor_id);
            *after.get_mut(&t.debtor_id).unwrap() += t.amount;
            *after.get_mut(&t.creditor_id).unwrap() -= t.amount;
        }

        for (_, amount) in after {
            prop_assert_eq!(amount, Decimal::ZERO);
        }
    }

    /// The suggester never emits more transfers than parties minus one.
    #[test]
    fn prop_suggester_transfer_bound(edges in edges_strategy()) {
        let balances = net_balances(&edges);
        let transfers = suggest_transfers(&balances);
        if balances.is_empty() {
            prop_assert!(transfers.is_empty());
        } else {
            prop_assert!(transfers.len() <= balances.len().saturating_sub(1));
        }
    }

    /// FIFO allocation conserves the requested amount and never over-consumes
    /// an edge.
    #[test]
    fn prop_allocate_fifo_conserves_amount(
        edges in edges_strategy(),
        numerator in 1u32..=100u32,
    ) {
        let mut edges = edges;
        edges.sort_by_key(|l| l.entry_date);
        let available: Decimal = edges.iter().map(|l| l.remaining).sum();
        prop_assume!(available > Decimal::ZERO);

        // Some fraction of the available total, at least one cent.
        let amount = round2(available * Decimal::new(i64::from(numerator), 2))
            .max(Decimal::new(1, 2));
        prop_assume!(amount <= available);

        let allocations = allocate_fifo(&edges, amount).unwrap();

        let allocated: Decimal = allocations.iter().map(|a| a.amount).sum();
        prop_assert_eq!(round2(allocated), amount);

        for a in &allocations {
            let edge = edges.iter().find(|l| l.split_id == a.split_id).unwrap();
            prop_assert!(a.amount > Decimal::ZERO);
            prop_assert!(a.amount <= edge.remaining);
        }

        // FIFO: every edge except the last consumed one is drained in full.
        for a in allocations.iter().rev().skip(1) {
            let edge = edges.iter().find(|l| l.split_id == a.split_id).unwrap();
            prop_assert_eq!(a.amount, edge.remaining);
        }
    }
}
