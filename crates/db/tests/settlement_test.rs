//! Integration tests for the settlement ledger.
//!
//! These exercise the full flow against an in-memory database: expenses with
//! splits, split lines net of settlements, FIFO pair settlement, undo, and
//! the draft batch lifecycle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use hearthbook_core::settlement::{EntryKind, SettlementError, SplitInput};
use hearthbook_db::migration::Migrator;
use hearthbook_db::repositories::expense::CreateExpenseInput;
use hearthbook_db::repositories::settlement::SettlementOpError;
use hearthbook_db::{ExpenseRepository, HouseholdRepository, SettlementRepository};
use hearthbook_shared::Period;

const DRAFT_PREFIX: &str = "[draft] ";

/// Fresh in-memory database with migrations applied.
async fn setup() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts)
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

async fn household_with_members(db: &DatabaseConnection, names: &[&str]) -> (Uuid, Vec<Uuid>) {
    let households = HouseholdRepository::new(db.clone());
    let household = households
        .create("Test Household")
        .await
        .expect("Failed to create household");
    let mut member_ids = Vec::new();
    for name in names {
        let member = households
            .add_member(household.id, name)
            .await
            .expect("Failed to add member");
        member_ids.push(member.id);
    }
    (household.id, member_ids)
}

/// Creates an expense paid by `payer` with one split per (debtor, amount)
/// pair, returning the split ids in input order.
async fn expense_with_splits(
    db: &DatabaseConnection,
    household_id: Uuid,
    date: &str,
    payer: Uuid,
    shares: &[(Uuid, Decimal)],
) -> Vec<Uuid> {
    let total: Decimal = shares.iter().map(|(_, a)| *a).sum::<Decimal>() * dec!(2);
    let created = ExpenseRepository::new(db.clone())
        .create_expense(CreateExpenseInput {
            household_id,
            entry_type: EntryKind::Expense,
            entry_date: d(date),
            description: "Shared expense".to_string(),
            amount: total,
            payer_id: Some(payer),
            splits: shares
                .iter()
                .map(|&(debtor_id, amount)| SplitInput {
                    debtor_id: Some(debtor_id),
                    amount,
                })
                .collect(),
        })
        .await
        .expect("Failed to create expense");

    shares
        .iter()
        .map(|&(debtor_id, amount)| {
            created
                .splits
                .iter()
                .find(|s| s.debtor_id == debtor_id && s.amount == amount)
                .expect("split should have been persisted")
                .id
        })
        .collect()
}

fn d(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

fn january() -> Period {
    Period::new(d("2024-01-01"), d("2024-01-31")).expect("valid period")
}

#[tokio::test]
async fn test_split_lines_net_of_settlements() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let splits = expense_with_splits(&db, household_id, "2024-01-10", m[0], &[(m[1], dec!(30))]).await;
    let repo = SettlementRepository::new(db.clone());

    repo.settle_split(household_id, january(), splits[0], dec!(10), "first payment")
        .await
        .expect("Failed to settle");

    let lines = repo
        .split_lines(household_id, january())
        .await
        .expect("Failed to load split lines");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].settled, dec!(10.00));
    assert_eq!(lines[0].remaining, dec!(20.00));
}

#[tokio::test]
async fn test_settle_rejects_over_settlement_with_available() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let splits = expense_with_splits(&db, household_id, "2024-01-10", m[0], &[(m[1], dec!(30))]).await;
    let repo = SettlementRepository::new(db.clone());

    repo.settle_split(household_id, january(), splits[0], dec!(20), "")
        .await
        .expect("Failed to settle");

    let err = repo
        .settle_split(household_id, january(), splits[0], dec!(15), "")
        .await
        .expect_err("Settling past the remaining balance must fail");

    match err {
        SettlementOpError::Rule(SettlementError::OverSettlement { requested, available }) => {
            assert_eq!(requested, dec!(15.00));
            assert_eq!(available, dec!(10.00));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_settle_pair_allocates_oldest_first() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let older = expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    let newer = expense_with_splits(&db, household_id, "2024-01-20", m[0], &[(m[1], dec!(15))]).await;
    let repo = SettlementRepository::new(db.clone());

    let created = repo
        .settle_pair(household_id, january(), m[1], m[0], dec!(25), "partial payback")
        .await
        .expect("Failed to settle pair");

    assert_eq!(created.header.amount, dec!(25.00));
    assert_eq!(created.items.len(), 2);
    let by_split: Vec<(Uuid, Decimal)> = created
        .items
        .iter()
        .map(|i| (i.split_id, i.amount))
        .collect();
    assert!(by_split.contains(&(older[0], dec!(20.00))));
    assert!(by_split.contains(&(newer[0], dec!(5.00))));

    let lines = repo
        .split_lines(household_id, january())
        .await
        .expect("Failed to load split lines");
    assert_eq!(lines[0].remaining, dec!(0.00));
    assert_eq!(lines[1].remaining, dec!(10.00));
}

#[tokio::test]
async fn test_undo_item_restores_balance_and_shrinks_header() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    expense_with_splits(&db, household_id, "2024-01-20", m[0], &[(m[1], dec!(15))]).await;
    let repo = SettlementRepository::new(db.clone());

    let created = repo
        .settle_pair(household_id, january(), m[1], m[0], dec!(35), "")
        .await
        .expect("Failed to settle pair");
    let undone_item = &created.items[1];

    repo.undo_item(household_id, undone_item.id)
        .await
        .expect("Failed to undo item");

    let listed = repo
        .list_settlements(household_id, Some(january()))
        .await
        .expect("Failed to list settlements");
    assert_eq!(listed.len(), 1);
    assert_eq!(
        listed[0].header.amount,
        dec!(35.00) - undone_item.amount,
        "header amount must keep matching the sum of its items"
    );
    assert_eq!(listed[0].items.len(), 1);

    let total_remaining: Decimal = repo
        .split_lines(household_id, january())
        .await
        .expect("Failed to load split lines")
        .iter()
        .map(|l| l.remaining)
        .sum();
    assert_eq!(total_remaining, undone_item.amount);
}

#[tokio::test]
async fn test_undo_last_item_removes_header() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let splits = expense_with_splits(&db, household_id, "2024-01-10", m[0], &[(m[1], dec!(30))]).await;
    let repo = SettlementRepository::new(db.clone());

    let created = repo
        .settle_split(household_id, january(), splits[0], dec!(30), "")
        .await
        .expect("Failed to settle");

    repo.undo_item(household_id, created.items[0].id)
        .await
        .expect("Failed to undo item");

    let listed = repo
        .list_settlements(household_id, None)
        .await
        .expect("Failed to list settlements");
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_undo_header_restores_balances() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    let repo = SettlementRepository::new(db.clone());

    let created = repo
        .settle_pair(household_id, january(), m[1], m[0], dec!(20), "")
        .await
        .expect("Failed to settle pair");

    repo.undo_header(household_id, created.header.id)
        .await
        .expect("Failed to undo settlement");

    let lines = repo
        .split_lines(household_id, january())
        .await
        .expect("Failed to load split lines");
    assert_eq!(lines[0].remaining, dec!(20.00));

    let missing = repo
        .undo_header(household_id, created.header.id)
        .await
        .expect_err("Undoing twice must report not found");
    assert!(matches!(missing, SettlementOpError::HeaderNotFound(_)));
}

#[tokio::test]
async fn test_undo_scoped_to_household() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let (other_household, _) = household_with_members(&db, &["Carol"]).await;
    expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    let repo = SettlementRepository::new(db.clone());

    let created = repo
        .settle_pair(household_id, january(), m[1], m[0], dec!(20), "")
        .await
        .expect("Failed to settle pair");

    let missing = repo
        .undo_header(other_household, created.header.id)
        .await
        .expect_err("Another household's id must not reach the settlement");
    assert!(matches!(missing, SettlementOpError::HeaderNotFound(_)));

    let missing = repo
        .undo_item(other_household, created.items[0].id)
        .await
        .expect_err("Another household's id must not reach the item");
    assert!(matches!(missing, SettlementOpError::ItemNotFound(_)));

    let listed = repo
        .list_settlements(household_id, None)
        .await
        .expect("Failed to list settlements");
    assert_eq!(listed.len(), 1, "settlement must survive the attempts");
    assert_eq!(listed[0].items.len(), 1);
}

#[tokio::test]
async fn test_settled_amounts_scoped_to_exact_period() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let splits = expense_with_splits(&db, household_id, "2024-01-10", m[0], &[(m[1], dec!(30))]).await;
    let repo = SettlementRepository::new(db.clone());

    repo.settle_split(household_id, january(), splits[0], dec!(30), "")
        .await
        .expect("Failed to settle");

    // Same split queried under a wider period: the header was recorded for
    // January exactly, so it does not count here.
    let wider = Period::new(d("2024-01-01"), d("2024-02-29")).expect("valid period");
    let lines = repo
        .split_lines(household_id, wider)
        .await
        .expect("Failed to load split lines");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].settled, dec!(0.00));
    assert_eq!(lines[0].remaining, dec!(30.00));
}

#[tokio::test]
async fn test_draft_generate_confirm_lifecycle() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob", "Carol"]).await;
    expense_with_splits(
        &db,
        household_id,
        "2024-01-05",
        m[0],
        &[(m[1], dec!(20)), (m[2], dec!(10))],
    )
    .await;
    let repo = SettlementRepository::new(db.clone());

    let drafts = repo
        .generate_drafts(household_id, january(), DRAFT_PREFIX, "settle january", false)
        .await
        .expect("Failed to generate drafts");

    assert_eq!(drafts.len(), 2, "one draft per debtor/creditor pair");
    assert!(drafts.iter().all(|d| d.header.note.starts_with(DRAFT_PREFIX)));

    // Drafts reserve the amounts they plan to settle.
    let lines = repo
        .split_lines(household_id, january())
        .await
        .expect("Failed to load split lines");
    assert!(lines.iter().all(|l| l.remaining == dec!(0.00)));

    let confirmed = repo
        .confirm_drafts(household_id, january(), DRAFT_PREFIX)
        .await
        .expect("Failed to confirm drafts");
    assert_eq!(confirmed, 2);

    let listed = repo
        .list_settlements(household_id, Some(january()))
        .await
        .expect("Failed to list settlements");
    assert!(listed.iter().all(|s| s.header.note == "settle january"));

    // Nothing left to clear once confirmed.
    let cleared = repo
        .clear_drafts(household_id, january(), DRAFT_PREFIX)
        .await
        .expect("Failed to clear drafts");
    assert_eq!(cleared, 0);
}

#[tokio::test]
async fn test_generate_drafts_replace_covers_new_debt() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    let repo = SettlementRepository::new(db.clone());

    repo.generate_drafts(household_id, january(), DRAFT_PREFIX, "", false)
        .await
        .expect("Failed to generate drafts");

    expense_with_splits(&db, household_id, "2024-01-12", m[0], &[(m[1], dec!(10))]).await;

    let drafts = repo
        .generate_drafts(household_id, january(), DRAFT_PREFIX, "", true)
        .await
        .expect("Failed to regenerate drafts");

    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].header.amount, dec!(30.00));
    assert_eq!(drafts[0].items.len(), 2);
}

#[tokio::test]
async fn test_clear_drafts_keeps_confirmed_settlements() {
    let db = setup().await;
    let (household_id, m) = household_with_members(&db, &["Alice", "Bob"]).await;
    let splits = expense_with_splits(&db, household_id, "2024-01-05", m[0], &[(m[1], dec!(20))]).await;
    let repo = SettlementRepository::new(db.clone());

    repo.settle_split(household_id, january(), splits[0], dec!(5), "confirmed payment")
        .await
        .expect("Failed to settle");
    repo.generate_drafts(household_id, january(), DRAFT_PREFIX, "", false)
        .await
        .expect("Failed to generate drafts");

    let cleared = repo
        .clear_drafts(household_id, january(), DRAFT_PREFIX)
        .await
        .expect("Failed to clear drafts");
    assert_eq!(cleared, 1);

    let listed = repo
        .list_settlements(household_id, Some(january()))
        .await
        .expect("Failed to list settlements");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].header.note, "confirmed payment");
}
