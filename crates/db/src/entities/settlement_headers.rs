//! `SeaORM` Entity for the settlement_headers table.
//!
//! One settlement transaction between exactly two members for one period.
//! A reserved prefix on `note` marks the header as a draft; confirming strips
//! the prefix and changes nothing else.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "settlement_headers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub household_id: Uuid,
    pub debtor_id: Uuid,
    pub creditor_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    pub from_date: Date,
    pub to_date: Date,
    pub note: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::households::Entity",
        from = "Column::HouseholdId",
        to = "super::households::Column::Id"
    )]
    Households,
    #[sea_orm(has_many = "super::settlement_items::Entity")]
    SettlementItems,
}

impl Related<super::households::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Households.def()
    }
}

impl Related<super::settlement_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
