//! `SeaORM` Entity for the households table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "households")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::members::Entity")]
    Members,
    #[sea_orm(has_many = "super::expense_entries::Entity")]
    ExpenseEntries,
    #[sea_orm(has_many = "super::settlement_headers::Entity")]
    SettlementHeaders,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::expense_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExpenseEntries.def()
    }
}

impl Related<super::settlement_headers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SettlementHeaders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
