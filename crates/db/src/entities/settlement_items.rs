//! `SeaORM` Entity for the settlement_items table.
//!
//! Allocation of part of a settlement header against one specific expense
//! split. The sum of item amounts for a split never exceeds the split amount;
//! that invariant is enforced at write time, not by a database constraint.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlement_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub settlement_id: Uuid,
    pub split_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::settlement_headers::Entity",
        from = "Column::SettlementId",
        to = "super::settlement_headers::Column::Id"
    )]
    SettlementHeaders,
    #[sea_orm(
        belongs_to = "super::expense_splits::Entity",
        from = "Column::SplitId",
        to = "super::expense_splits::Column::Id"
    )]
    ExpenseSplits,
}

impl Related<super::settlement_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementHeaders.def()
    }
}

impl Related<super::expense_splits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseSplits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
