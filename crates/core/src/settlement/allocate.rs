//! FIFO allocation of a payment across debt edges.

use rust_decimal::Decimal;

use super::error::SettlementError;
use super::types::{Allocation, SplitLine};
use crate::money::round2;

/// Allocates a settlement amount across edges, oldest debt first.
///
/// `lines` must already be restricted to the debtor/creditor pair being
/// settled; only edges with a positive remaining balance participate. The
/// amount is consumed greedily in entry-date order (the order `lines` is
/// already in), producing one allocation per edge consumed.
///
/// # Errors
///
/// Returns [`SettlementError::NonPositiveAmount`] if `amount <= 0`, or
/// [`SettlementError::OverSettlement`] (carrying the total remaining as the
/// maximum) if the amount exceeds what is outstanding across the edges.
pub fn allocate_fifo(
    lines: &[SplitLine],
    amount: Decimal,
) -> Result<Vec<Allocation>, SettlementError> {
    let amount = round2(amount);
    if amount <= Decimal::ZERO {
        return Err(SettlementError::NonPositiveAmount(amount));
    }

    let open: Vec<&SplitLine> = lines
        .iter()
        .filter(|l| l.remaining > Decimal::ZERO)
        .collect();

    let available = round2(open.iter().map(|l| l.remaining).sum::<Decimal>());
    if amount > available {
        return Err(SettlementError::OverSettlement {
            requested: amount,
            available,
        });
    }

    let mut allocations = Vec::new();
    let mut left = amount;
    for line in open {
        if left <= Decimal::ZERO {
            break;
        }
        let take = round2(left.min(line.remaining));
        allocations.push(Allocation {
            split_id: line.split_id,
            amount: take,
        });
        left = round2(left - take);
    }

    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn line(day: u32, remaining: Decimal) -> SplitLine {
        SplitLine {
            split_id: Uuid::new_v4(),
            entry_id: Uuid::new_v4(),
            entry_date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            creditor_id: Uuid::new_v4(),
            debtor_id: Uuid::new_v4(),
            amount: remaining,
            settled: Decimal::ZERO,
            remaining,
        }
    }

    #[test]
    fn test_fifo_consumes_oldest_first() {
        let older = line(1, dec!(20));
        let newer = line(2, dec!(15));
        let (older_id, newer_id) = (older.split_id, newer.split_id);

        let allocations = allocate_fifo(&[older, newer], dec!(25)).unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0], Allocation { split_id: older_id, amount: dec!(20) });
        assert_eq!(allocations[1], Allocation { split_id: newer_id, amount: dec!(5) });
    }

    #[test]
    fn test_exact_single_edge() {
        let l = line(1, dec!(30));
        let id = l.split_id;
        let allocations = allocate_fifo(&[l], dec!(30)).unwrap();
        assert_eq!(allocations, vec![Allocation { split_id: id, amount: dec!(30) }]);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        let l = line(1, dec!(30));
        assert_eq!(
            allocate_fifo(&[l.clone()], dec!(0)),
            Err(SettlementError::NonPositiveAmount(dec!(0.00)))
        );
        assert!(matches!(
            allocate_fifo(&[l], dec!(-5)),
            Err(SettlementError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_rejects_over_settlement_with_maximum() {
        let edges = [line(1, dec!(20)), line(2, dec!(15))];
        assert_eq!(
            allocate_fifo(&edges, dec!(40)),
            Err(SettlementError::OverSettlement {
                requested: dec!(40.00),
                available: dec!(35.00),
            })
        );
    }

    #[test]
    fn test_skips_fully_settled_edges() {
        let mut closed = line(1, dec!(20));
        closed.settled = dec!(20);
        closed.remaining = Decimal::ZERO;
        let open = line(2, dec!(15));
        let open_id = open.split_id;

        let allocations = allocate_fifo(&[closed, open], dec!(10)).unwrap();
        assert_eq!(allocations, vec![Allocation { split_id: open_id, amount: dec!(10) }]);
    }
}
