//! Settlement repository: the ledger of who paid back whom.
//!
//! A settlement is a header (debtor, creditor, amount, period, note) plus one
//! item per split it pays down. Every multi-record write runs inside a single
//! database transaction, and every write that adds items re-checks the
//! affected splits before committing so that two concurrent settlements can
//! never push a split past its obligated amount.
//!
//! Settled amounts are scoped to the exact period a header was recorded for:
//! a header whose range merely overlaps the queried period does not count.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use hearthbook_core::money::round2;
use hearthbook_core::settlement::{
    Allocation, RawSplit, SettlementError, SplitLine, allocate_fifo, apply_draft_prefix,
    build_split_lines, is_draft_note, plan_drafts, strip_draft_prefix,
};
use hearthbook_shared::Period;

use crate::entities::{EntryType, expense_entries, expense_splits, settlement_headers, settlement_items};

/// Error types for settlement ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum SettlementOpError {
    /// A settlement business rule was violated.
    #[error(transparent)]
    Rule(#[from] SettlementError),

    /// The targeted split does not exist in the period, or is not open.
    #[error("Split not found in period: {0}")]
    SplitNotFound(Uuid),

    /// Settlement header not found.
    #[error("Settlement not found: {0}")]
    HeaderNotFound(Uuid),

    /// Settlement item not found.
    #[error("Settlement item not found: {0}")]
    ItemNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl SettlementOpError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rule(e) => e.error_code(),
            Self::SplitNotFound(_) => "SPLIT_NOT_FOUND",
            Self::HeaderNotFound(_) => "SETTLEMENT_NOT_FOUND",
            Self::ItemNotFound(_) => "SETTLEMENT_ITEM_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Rule(e) => e.http_status_code(),
            Self::SplitNotFound(_) | Self::HeaderNotFound(_) | Self::ItemNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// A settlement header together with its per-split items.
#[derive(Debug, Clone)]
pub struct SettlementWithItems {
    /// The header record.
    pub header: settlement_headers::Model,
    /// Its allocations against individual splits.
    pub items: Vec<settlement_items::Model>,
}

/// Settlement repository for ledger reads and writes.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the household's debt edges for a period, net of recorded
    /// settlements, oldest entry first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn split_lines(
        &self,
        household_id: Uuid,
        period: Period,
    ) -> Result<Vec<SplitLine>, SettlementOpError> {
        Ok(fetch_split_lines(&self.db, household_id, period).await?)
    }

    /// Records a settlement against one specific split.
    ///
    /// Header and item are written in one transaction; the split's item total
    /// is re-checked before commit so a concurrent settlement cannot push it
    /// past the obligated amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the split is not part of the period, the amount is
    /// non-positive or exceeds the split's remaining balance, or the database
    /// operation fails.
    pub async fn settle_split(
        &self,
        household_id: Uuid,
        period: Period,
        split_id: Uuid,
        amount: Decimal,
        note: &str,
    ) -> Result<SettlementWithItems, SettlementOpError> {
        let amount = round2(amount);
        if amount <= Decimal::ZERO {
            return Err(SettlementError::NonPositiveAmount(amount).into());
        }

        let txn = self.db.begin().await?;

        let lines = fetch_split_lines(&txn, household_id, period).await?;
        let line = lines
            .iter()
            .find(|l| l.split_id == split_id)
            .ok_or(SettlementOpError::SplitNotFound(split_id))?;
        if amount > line.remaining {
            return Err(SettlementError::OverSettlement {
                requested: amount,
                available: line.remaining,
            }
            .into());
        }

        let allocations = vec![Allocation { split_id, amount }];
        let created = insert_settlement(
            &txn,
            household_id,
            line.debtor_id,
            line.creditor_id,
            amount,
            period,
            note,
            &allocations,
        )
        .await?;
        verify_no_over_settlement(&txn, household_id, period, &allocations).await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Records a settlement from one debtor to one creditor, allocated across
    /// their open splits oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is non-positive or exceeds the pair's
    /// total remaining balance, or the database operation fails.
    pub async fn settle_pair(
        &self,
        household_id: Uuid,
        period: Period,
        debtor_id: Uuid,
        creditor_id: Uuid,
        amount: Decimal,
        note: &str,
    ) -> Result<SettlementWithItems, SettlementOpError> {
        let amount = round2(amount);
        let txn = self.db.begin().await?;

        let lines = fetch_split_lines(&txn, household_id, period).await?;
        let pair: Vec<SplitLine> = lines
            .into_iter()
            .filter(|l| l.debtor_id == debtor_id && l.creditor_id == creditor_id)
            .collect();
        let allocations = allocate_fifo(&pair, amount).map_err(SettlementOpError::Rule)?;

        let created = insert_settlement(
            &txn,
            household_id,
            debtor_id,
            creditor_id,
            amount,
            period,
            note,
            &allocations,
        )
        .await?;
        verify_no_over_settlement(&txn, household_id, period, &allocations).await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Removes one item from a settlement.
    ///
    /// The header's amount shrinks by the item amount so it keeps matching
    /// the sum of its items; a header left with no items is deleted.
    ///
    /// An item whose settlement belongs to a different household reports
    /// not-found, never the other household's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist in the household, or the
    /// database operation fails.
    pub async fn undo_item(
        &self,
        household_id: Uuid,
        item_id: Uuid,
    ) -> Result<(), SettlementOpError> {
        let txn = self.db.begin().await?;

        let item = settlement_items::Entity::find_by_id(item_id)
            .one(&txn)
            .await?
            .ok_or(SettlementOpError::ItemNotFound(item_id))?;
        let header = settlement_headers::Entity::find_by_id(item.settlement_id)
            .filter(settlement_headers::Column::HouseholdId.eq(household_id))
            .one(&txn)
            .await?
            .ok_or(SettlementOpError::ItemNotFound(item_id))?;

        settlement_items::Entity::delete_by_id(item_id)
            .exec(&txn)
            .await?;

        let remaining = settlement_items::Entity::find()
            .filter(settlement_items::Column::SettlementId.eq(header.id))
            .all(&txn)
            .await?;
        if remaining.is_empty() {
            settlement_headers::Entity::delete_by_id(header.id)
                .exec(&txn)
                .await?;
        } else {
            let new_amount = round2(header.amount - item.amount);
            let mut active: settlement_headers::ActiveModel = header.into();
            active.amount = Set(new_amount);
            active.update(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Removes a settlement header with all of its items.
    ///
    /// A header belonging to a different household reports not-found.
    ///
    /// # Errors
    ///
    /// Returns an error if the header does not exist in the household or the
    /// database operation fails.
    pub async fn undo_header(
        &self,
        household_id: Uuid,
        header_id: Uuid,
    ) -> Result<(), SettlementOpError> {
        let txn = self.db.begin().await?;

        settlement_headers::Entity::find_by_id(header_id)
            .filter(settlement_headers::Column::HouseholdId.eq(household_id))
            .one(&txn)
            .await?
            .ok_or(SettlementOpError::HeaderNotFound(header_id))?;

        settlement_items::Entity::delete_many()
            .filter(settlement_items::Column::SettlementId.eq(header_id))
            .exec(&txn)
            .await?;
        settlement_headers::Entity::delete_by_id(header_id)
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }

    /// Generates one draft settlement per debtor/creditor pair, settling
    /// each pair's open splits in full.
    ///
    /// With `replace`, existing drafts for the period are cleared first (in
    /// the same transaction) so the new batch reflects the full remaining
    /// debt. Without it, existing drafts keep counting as settled and the
    /// batch covers only what is left.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn generate_drafts(
        &self,
        household_id: Uuid,
        period: Period,
        prefix: &str,
        note: &str,
        replace: bool,
    ) -> Result<Vec<SettlementWithItems>, SettlementOpError> {
        let txn = self.db.begin().await?;

        if replace {
            delete_drafts(&txn, household_id, period, prefix).await?;
        }

        let lines = fetch_split_lines(&txn, household_id, period).await?;
        let plans = plan_drafts(&lines);

        let draft_note = apply_draft_prefix(prefix, note);
        let mut created = Vec::with_capacity(plans.len());
        let mut touched: Vec<Allocation> = Vec::new();
        for plan in plans {
            touched.extend_from_slice(&plan.items);
            created.push(
                insert_settlement(
                    &txn,
                    household_id,
                    plan.debtor_id,
                    plan.creditor_id,
                    plan.total,
                    period,
                    &draft_note,
                    &plan.items,
                )
                .await?,
            );
        }
        verify_no_over_settlement(&txn, household_id, period, &touched).await?;

        txn.commit().await?;
        Ok(created)
    }

    /// Confirms every draft for the period by stripping the note prefix.
    ///
    /// Returns the number of headers confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn confirm_drafts(
        &self,
        household_id: Uuid,
        period: Period,
        prefix: &str,
    ) -> Result<u64, SettlementOpError> {
        let txn = self.db.begin().await?;

        let headers = period_headers(&txn, household_id, period).await?;
        let mut confirmed = 0;
        for header in headers {
            if let Some(note) = strip_draft_prefix(prefix, &header.note) {
                let mut active: settlement_headers::ActiveModel = header.into();
                active.note = Set(note);
                active.update(&txn).await?;
                confirmed += 1;
            }
        }

        txn.commit().await?;
        Ok(confirmed)
    }

    /// Deletes every draft for the period, items included.
    ///
    /// Returns the number of headers deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn clear_drafts(
        &self,
        household_id: Uuid,
        period: Period,
        prefix: &str,
    ) -> Result<u64, SettlementOpError> {
        let txn = self.db.begin().await?;
        let deleted = delete_drafts(&txn, household_id, period, prefix).await?;
        txn.commit().await?;
        Ok(deleted)
    }

    /// Lists a household's settlements with their items, newest first.
    ///
    /// With a period, only headers recorded for exactly that period are
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_settlements(
        &self,
        household_id: Uuid,
        period: Option<Period>,
    ) -> Result<Vec<SettlementWithItems>, SettlementOpError> {
        let mut query = settlement_headers::Entity::find()
            .filter(settlement_headers::Column::HouseholdId.eq(household_id));
        if let Some(p) = period {
            query = query
                .filter(settlement_headers::Column::FromDate.eq(p.from))
                .filter(settlement_headers::Column::ToDate.eq(p.to));
        }
        let headers = query
            .order_by_desc(settlement_headers::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let header_ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let mut items = settlement_items::Entity::find()
            .filter(settlement_items::Column::SettlementId.is_in(header_ids))
            .all(&self.db)
            .await?;

        Ok(headers
            .into_iter()
            .map(|header| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    items.drain(..).partition(|i| i.settlement_id == header.id);
                items = rest;
                SettlementWithItems { header, items: own }
            })
            .collect())
    }
}

/// Loads the period's debt edges net of settlements, on any connection.
///
/// Generic over the connection so callers can run it inside an open
/// transaction and see their own uncommitted writes.
pub(crate) async fn fetch_split_lines<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    period: Period,
) -> Result<Vec<SplitLine>, DbErr> {
    let entries = expense_entries::Entity::find()
        .filter(expense_entries::Column::HouseholdId.eq(household_id))
        .filter(expense_entries::Column::DeletedAt.is_null())
        .filter(expense_entries::Column::EntryType.eq(EntryType::Expense))
        .filter(expense_entries::Column::EntryDate.gte(period.from))
        .filter(expense_entries::Column::EntryDate.lte(period.to))
        .all(conn)
        .await?;
    if entries.is_empty() {
        return Ok(Vec::new());
    }

    let date_by_entry: HashMap<Uuid, NaiveDate> =
        entries.iter().map(|e| (e.id, e.entry_date)).collect();
    let entry_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();

    let splits = expense_splits::Entity::find()
        .filter(expense_splits::Column::EntryId.is_in(entry_ids))
        .all(conn)
        .await?;

    let settled = settled_by_split(conn, household_id, period).await?;

    let raw: Vec<RawSplit> = splits
        .into_iter()
        .filter_map(|s| {
            date_by_entry.get(&s.entry_id).map(|&entry_date| RawSplit {
                split_id: s.id,
                entry_id: s.entry_id,
                entry_date,
                creditor_id: s.creditor_id,
                debtor_id: s.debtor_id,
                amount: s.amount,
            })
        })
        .collect();

    Ok(build_split_lines(raw, &settled))
}

/// Sums the period's settlement items per split.
///
/// Only headers recorded for exactly this period count; drafts count too,
/// since a draft already reserves the amount it plans to settle.
async fn settled_by_split<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    period: Period,
) -> Result<HashMap<Uuid, Decimal>, DbErr> {
    let headers = period_headers(conn, household_id, period).await?;
    if headers.is_empty() {
        return Ok(HashMap::new());
    }
    let header_ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();

    let items = settlement_items::Entity::find()
        .filter(settlement_items::Column::SettlementId.is_in(header_ids))
        .all(conn)
        .await?;

    let mut settled: HashMap<Uuid, Decimal> = HashMap::new();
    for item in items {
        let total = settled.entry(item.split_id).or_insert(Decimal::ZERO);
        *total = round2(*total + item.amount);
    }
    Ok(settled)
}

/// Headers recorded for exactly this household and period.
async fn period_headers<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    period: Period,
) -> Result<Vec<settlement_headers::Model>, DbErr> {
    settlement_headers::Entity::find()
        .filter(settlement_headers::Column::HouseholdId.eq(household_id))
        .filter(settlement_headers::Column::FromDate.eq(period.from))
        .filter(settlement_headers::Column::ToDate.eq(period.to))
        .all(conn)
        .await
}

/// Inserts one header and its items.
async fn insert_settlement<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    debtor_id: Uuid,
    creditor_id: Uuid,
    amount: Decimal,
    period: Period,
    note: &str,
    allocations: &[Allocation],
) -> Result<SettlementWithItems, DbErr> {
    let header = settlement_headers::ActiveModel {
        id: Set(Uuid::new_v4()),
        household_id: Set(household_id),
        debtor_id: Set(debtor_id),
        creditor_id: Set(creditor_id),
        amount: Set(round2(amount)),
        from_date: Set(period.from),
        to_date: Set(period.to),
        note: Set(note.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(allocations.len());
    for allocation in allocations {
        let item = settlement_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            settlement_id: Set(header.id),
            split_id: Set(allocation.split_id),
            amount: Set(round2(allocation.amount)),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await?;
        items.push(item);
    }

    Ok(SettlementWithItems { header, items })
}

/// Re-checks the just-written splits inside the open transaction.
///
/// If a concurrent settlement slipped in between reading the remaining
/// balances and inserting the items, the combined item total can exceed the
/// split's obligated amount; returning the error here rolls the transaction
/// back.
async fn verify_no_over_settlement<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    period: Period,
    inserted: &[Allocation],
) -> Result<(), SettlementOpError> {
    if inserted.is_empty() {
        return Ok(());
    }

    let settled = settled_by_split(conn, household_id, period).await?;
    let split_ids: Vec<Uuid> = inserted.iter().map(|a| a.split_id).collect();
    let splits = expense_splits::Entity::find()
        .filter(expense_splits::Column::Id.is_in(split_ids))
        .all(conn)
        .await?;
    let amount_by_split: HashMap<Uuid, Decimal> =
        splits.into_iter().map(|s| (s.id, round2(s.amount))).collect();

    for allocation in inserted {
        let obligated = amount_by_split
            .get(&allocation.split_id)
            .copied()
            .ok_or(SettlementOpError::SplitNotFound(allocation.split_id))?;
        let total = settled
            .get(&allocation.split_id)
            .copied()
            .unwrap_or(Decimal::ZERO);
        if total > obligated {
            let available = round2(obligated - (total - allocation.amount)).max(Decimal::ZERO);
            return Err(SettlementError::OverSettlement {
                requested: allocation.amount,
                available,
            }
            .into());
        }
    }
    Ok(())
}

/// Deletes the period's draft headers and their items. Returns the header
/// count.
async fn delete_drafts<C: ConnectionTrait>(
    conn: &C,
    household_id: Uuid,
    period: Period,
    prefix: &str,
) -> Result<u64, DbErr> {
    let drafts: Vec<Uuid> = period_headers(conn, household_id, period)
        .await?
        .into_iter()
        .filter(|h| is_draft_note(prefix, &h.note))
        .map(|h| h.id)
        .collect();
    if drafts.is_empty() {
        return Ok(0);
    }

    settlement_items::Entity::delete_many()
        .filter(settlement_items::Column::SettlementId.is_in(drafts.clone()))
        .exec(conn)
        .await?;
    let result = settlement_headers::Entity::delete_many()
        .filter(settlement_headers::Column::Id.is_in(drafts))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
