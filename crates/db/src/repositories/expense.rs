//! Expense repository for expense entries and their splits.
//!
//! Expenses are the precondition of the settlement subsystem: every split row
//! is one debt edge. Splits are immutable once written; editing an entry's
//! splits deletes them all and reinserts the new set.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use hearthbook_core::money::round2;
use hearthbook_core::settlement::{EntryKind, SettlementError, SplitInput, validate_split};
use hearthbook_shared::Period;

use crate::entities::{EntryType, expense_entries, expense_splits, members};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// A split business rule was violated.
    #[error(transparent)]
    Rule(#[from] SettlementError),

    /// A referenced member does not belong to the household.
    #[error("Member {0} does not belong to the household")]
    UnknownMember(Uuid),

    /// Expense entry not found.
    #[error("Expense entry not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ExpenseError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Rule(e) => e.error_code(),
            Self::UnknownMember(_) => "UNKNOWN_MEMBER",
            Self::NotFound(_) => "EXPENSE_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Rule(e) => e.http_status_code(),
            Self::UnknownMember(_) => 400,
            Self::NotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating an expense entry with optional splits.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Owning household.
    pub household_id: Uuid,
    /// Expense or income.
    pub entry_type: EntryKind,
    /// Calendar date of the entry.
    pub entry_date: NaiveDate,
    /// Free-text description.
    pub description: String,
    /// Total entry amount.
    pub amount: Decimal,
    /// The member who paid. Required when splits are present.
    pub payer_id: Option<Uuid>,
    /// Proposed shares; empty means an unsplit entry.
    pub splits: Vec<SplitInput>,
}

/// An expense entry together with its splits.
#[derive(Debug, Clone)]
pub struct ExpenseWithSplits {
    /// The entry header.
    pub entry: expense_entries::Model,
    /// The debt edges it produced.
    pub splits: Vec<expense_splits::Model>,
}

fn kind_to_db(kind: EntryKind) -> EntryType {
    match kind {
        EntryKind::Expense => EntryType::Expense,
        EntryKind::Income => EntryType::Income,
    }
}

/// Expense repository for entry and split CRUD.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense entry with validated splits.
    ///
    /// The split rules are checked before anything is written; the entry and
    /// its splits are inserted inside one database transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails, a referenced member does not
    /// belong to the household, or the database operation fails.
    pub async fn create_expense(
        &self,
        input: CreateExpenseInput,
    ) -> Result<ExpenseWithSplits, ExpenseError> {
        validate_split(
            input.entry_type,
            input.amount,
            input.payer_id,
            &input.splits,
        )?;
        self.check_members(&input).await?;

        let txn = self.db.begin().await?;

        let entry = expense_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            household_id: Set(input.household_id),
            entry_type: Set(kind_to_db(input.entry_type)),
            entry_date: Set(input.entry_date),
            description: Set(input.description.clone()),
            amount: Set(round2(input.amount)),
            payer_id: Set(input.payer_id),
            created_at: Set(Utc::now().into()),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let splits = insert_splits(&txn, &entry, &input.splits).await?;

        txn.commit().await?;
        Ok(ExpenseWithSplits { entry, splits })
    }

    /// Replaces the splits of an existing expense entry.
    ///
    /// Edit is delete-all-plus-reinsert; split rows are never updated in
    /// place.
    pub async fn replace_splits(
        &self,
        household_id: Uuid,
        entry_id: Uuid,
        splits: Vec<SplitInput>,
    ) -> Result<ExpenseWithSplits, ExpenseError> {
        let entry = self.find_live_entry(household_id, entry_id).await?;

        let kind = match entry.entry_type {
            EntryType::Expense => EntryKind::Expense,
            EntryType::Income => EntryKind::Income,
        };
        validate_split(kind, entry.amount, entry.payer_id, &splits)?;

        let txn = self.db.begin().await?;

        expense_splits::Entity::delete_many()
            .filter(expense_splits::Column::EntryId.eq(entry_id))
            .exec(&txn)
            .await?;
        let splits = insert_splits(&txn, &entry, &splits).await?;

        txn.commit().await?;
        Ok(ExpenseWithSplits { entry, splits })
    }

    /// Lists a household's live expense entries with their splits, optionally
    /// restricted to a period, newest first.
    pub async fn list_expenses(
        &self,
        household_id: Uuid,
        period: Option<Period>,
    ) -> Result<Vec<ExpenseWithSplits>, ExpenseError> {
        let mut query = expense_entries::Entity::find()
            .filter(expense_entries::Column::HouseholdId.eq(household_id))
            .filter(expense_entries::Column::DeletedAt.is_null());

        if let Some(p) = period {
            query = query
                .filter(expense_entries::Column::EntryDate.gte(p.from))
                .filter(expense_entries::Column::EntryDate.lte(p.to));
        }

        let entries = query
            .order_by_desc(expense_entries::Column::EntryDate)
            .order_by_desc(expense_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;

        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let entry_ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        let mut splits = expense_splits::Entity::find()
            .filter(expense_splits::Column::EntryId.is_in(entry_ids))
            .all(&self.db)
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    splits.drain(..).partition(|s| s.entry_id == entry.id);
                splits = rest;
                ExpenseWithSplits { entry, splits: own }
            })
            .collect())
    }

    /// Soft-deletes an expense entry.
    ///
    /// The entry and its splits stop appearing in every query; the rows are
    /// kept.
    pub async fn delete_expense(
        &self,
        household_id: Uuid,
        entry_id: Uuid,
    ) -> Result<(), ExpenseError> {
        let entry = self.find_live_entry(household_id, entry_id).await?;

        let mut active: expense_entries::ActiveModel = entry.into();
        active.deleted_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await?;

        Ok(())
    }

    async fn find_live_entry(
        &self,
        household_id: Uuid,
        entry_id: Uuid,
    ) -> Result<expense_entries::Model, ExpenseError> {
        expense_entries::Entity::find_by_id(entry_id)
            .filter(expense_entries::Column::HouseholdId.eq(household_id))
            .filter(expense_entries::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(entry_id))
    }

    /// Verifies that the payer and every debtor belong to the household.
    async fn check_members(&self, input: &CreateExpenseInput) -> Result<(), ExpenseError> {
        let mut referenced: Vec<Uuid> = input.payer_id.into_iter().collect();
        referenced.extend(input.splits.iter().filter_map(|s| s.debtor_id));
        if referenced.is_empty() {
            return Ok(());
        }

        let known: Vec<Uuid> = members::Entity::find()
            .filter(members::Column::HouseholdId.eq(input.household_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        for id in referenced {
            if !known.contains(&id) {
                return Err(ExpenseError::UnknownMember(id));
            }
        }
        Ok(())
    }
}

/// Inserts split rows for an entry. The payer is the creditor of every edge.
async fn insert_splits(
    txn: &DatabaseTransaction,
    entry: &expense_entries::Model,
    splits: &[SplitInput],
) -> Result<Vec<expense_splits::Model>, ExpenseError> {
    let mut inserted = Vec::with_capacity(splits.len());
    for split in splits {
        // Validation guarantees both ids are present for non-empty splits.
        let debtor_id = split.debtor_id.ok_or(SettlementError::MissingDebtor)?;
        let creditor_id = entry.payer_id.ok_or(SettlementError::MissingPayer)?;

        let row = expense_splits::ActiveModel {
            id: Set(Uuid::new_v4()),
            entry_id: Set(entry.id),
            creditor_id: Set(creditor_id),
            debtor_id: Set(debtor_id),
            amount: Set(round2(split.amount)),
            created_at: Set(Utc::now().into()),
        }
        .insert(txn)
        .await?;
        inserted.push(row);
    }
    Ok(inserted)
}
