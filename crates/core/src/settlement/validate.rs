//! Split validation before an expense is persisted.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::SettlementError;
use super::types::{EntryKind, SplitInput};
use crate::money::round2;

/// Validates a proposed expense split against the business rules.
///
/// An empty split list is trivially valid (an unsplit expense). Otherwise:
/// - only expense entries may be split
/// - a payer is required
/// - every line needs a debtor distinct from the payer
/// - every line amount must be positive
/// - the shares may not exceed the expense total
///
/// Pure validation: persistence is the caller's responsibility.
///
/// # Errors
///
/// Returns the first rule violation found, in the order listed above.
pub fn validate_split(
    kind: EntryKind,
    total_amount: Decimal,
    payer_id: Option<Uuid>,
    lines: &[SplitInput],
) -> Result<(), SettlementError> {
    if lines.is_empty() {
        return Ok(());
    }

    if kind != EntryKind::Expense {
        return Err(SettlementError::NotAnExpense);
    }

    let Some(payer) = payer_id else {
        return Err(SettlementError::MissingPayer);
    };

    let mut shares = Decimal::ZERO;
    for line in lines {
        let Some(debtor) = line.debtor_id else {
            return Err(SettlementError::MissingDebtor);
        };
        if debtor == payer {
            return Err(SettlementError::SelfDebt(debtor));
        }
        if line.amount <= Decimal::ZERO {
            return Err(SettlementError::NonPositiveShare(line.amount));
        }
        shares = round2(shares + line.amount);
    }

    if shares > round2(total_amount) {
        return Err(SettlementError::SharesExceedTotal {
            shares,
            total: round2(total_amount),
        });
    }

    Ok(())
}
