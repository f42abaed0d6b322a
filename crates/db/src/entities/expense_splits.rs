//! `SeaORM` Entity for the expense_splits table.
//!
//! One row is one debt edge: `debtor_id` owes `creditor_id` the share of the
//! owning expense entry. Rows are immutable once created; editing an entry's
//! splits deletes them all and reinserts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expense_splits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entry_id: Uuid,
    pub creditor_id: Uuid,
    pub debtor_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expense_entries::Entity",
        from = "Column::EntryId",
        to = "super::expense_entries::Column::Id"
    )]
    ExpenseEntries,
    #[sea_orm(has_many = "super::settlement_items::Entity")]
    SettlementItems,
}

impl Related<super::expense_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseEntries.def()
    }
}

impl Related<super::settlement_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
