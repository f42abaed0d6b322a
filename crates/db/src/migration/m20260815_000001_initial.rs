//! Initial database migration.
//!
//! Creates the household, member, expense, and settlement tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Households::Table)
                    .col(ColumnDef::new(Households::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Households::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Households::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Members::Table)
                    .col(ColumnDef::new(Members::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Members::HouseholdId).uuid().not_null())
                    .col(ColumnDef::new(Members::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Members::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_members_household")
                            .from(Members::Table, Members::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_members_household")
                    .table(Members::Table)
                    .col(Members::HouseholdId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseEntries::Table)
                    .col(
                        ColumnDef::new(ExpenseEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::HouseholdId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExpenseEntries::EntryType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::EntryDate).date().not_null())
                    .col(
                        ColumnDef::new(ExpenseEntries::Description)
                            .string_len(500)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseEntries::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::PayerId).uuid())
                    .col(
                        ColumnDef::new(ExpenseEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpenseEntries::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_entries_household")
                            .from(ExpenseEntries::Table, ExpenseEntries::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expense_entries_household_date")
                    .table(ExpenseEntries::Table)
                    .col(ExpenseEntries::HouseholdId)
                    .col(ExpenseEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseSplits::Table)
                    .col(
                        ColumnDef::new(ExpenseSplits::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseSplits::EntryId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseSplits::CreditorId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseSplits::DebtorId).uuid().not_null())
                    .col(
                        ColumnDef::new(ExpenseSplits::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseSplits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_splits_entry")
                            .from(ExpenseSplits::Table, ExpenseSplits::EntryId)
                            .to(ExpenseEntries::Table, ExpenseEntries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_expense_splits_entry")
                    .table(ExpenseSplits::Table)
                    .col(ExpenseSplits::EntryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SettlementHeaders::Table)
                    .col(
                        ColumnDef::new(SettlementHeaders::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SettlementHeaders::HouseholdId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SettlementHeaders::DebtorId).uuid().not_null())
                    .col(
                        ColumnDef::new(SettlementHeaders::CreditorId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SettlementHeaders::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SettlementHeaders::FromDate).date().not_null())
                    .col(ColumnDef::new(SettlementHeaders::ToDate).date().not_null())
                    .col(
                        ColumnDef::new(SettlementHeaders::Note)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(SettlementHeaders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settlement_headers_household")
                            .from(SettlementHeaders::Table, SettlementHeaders::HouseholdId)
                            .to(Households::Table, Households::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_settlement_headers_household_period")
                    .table(SettlementHeaders::Table)
                    .col(SettlementHeaders::HouseholdId)
                    .col(SettlementHeaders::FromDate)
                    .col(SettlementHeaders::ToDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SettlementItems::Table)
                    .col(
                        ColumnDef::new(SettlementItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SettlementItems::SettlementId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SettlementItems::SplitId).uuid().not_null())
                    .col(
                        ColumnDef::new(SettlementItems::Amount)
                            .decimal_len(12, 2)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SettlementItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settlement_items_settlement")
                            .from(SettlementItems::Table, SettlementItems::SettlementId)
                            .to(SettlementHeaders::Table, SettlementHeaders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_settlement_items_split")
                            .from(SettlementItems::Table, SettlementItems::SplitId)
                            .to(ExpenseSplits::Table, ExpenseSplits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_settlement_items_settlement")
                    .table(SettlementItems::Table)
                    .col(SettlementItems::SettlementId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_settlement_items_split")
                    .table(SettlementItems::Table)
                    .col(SettlementItems::SplitId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SettlementItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SettlementHeaders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseSplits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Members::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Households::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Households {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Members {
    Table,
    Id,
    HouseholdId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ExpenseEntries {
    Table,
    Id,
    HouseholdId,
    EntryType,
    EntryDate,
    Description,
    Amount,
    PayerId,
    CreatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum ExpenseSplits {
    Table,
    Id,
    EntryId,
    CreditorId,
    DebtorId,
    Amount,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SettlementHeaders {
    Table,
    Id,
    HouseholdId,
    DebtorId,
    CreditorId,
    Amount,
    FromDate,
    ToDate,
    Note,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SettlementItems {
    Table,
    Id,
    SettlementId,
    SplitId,
    Amount,
    CreatedAt,
}
