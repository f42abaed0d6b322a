//! Database seeder for Hearthbook development and testing.
//!
//! Seeds a demo household with members and a month of shared expenses so the
//! settlement endpoints have something to chew on locally.
//!
//! Usage: cargo run --bin seeder

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use hearthbook_db::entities::{EntryType, expense_entries, expense_splits, households, members};

/// Demo household ID (consistent for all seeds)
const DEMO_HOUSEHOLD_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Demo member IDs (consistent for all seeds)
const DEMO_MEMBER_IDS: [&str; 3] = [
    "00000000-0000-0000-0000-000000000011",
    "00000000-0000-0000-0000-000000000012",
    "00000000-0000-0000-0000-000000000013",
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = hearthbook_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo household...");
    seed_household(&db).await;

    println!("Seeding demo members...");
    seed_members(&db).await;

    println!("Seeding demo expenses...");
    seed_expenses(&db).await;

    println!("Seeding complete!");
}

fn demo_household_id() -> Uuid {
    Uuid::parse_str(DEMO_HOUSEHOLD_ID).unwrap()
}

fn demo_member_id(index: usize) -> Uuid {
    Uuid::parse_str(DEMO_MEMBER_IDS[index]).unwrap()
}

/// Seeds the demo household.
async fn seed_household(db: &DatabaseConnection) {
    if households::Entity::find_by_id(demo_household_id())
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Demo household already exists, skipping...");
        return;
    }

    let household = households::ActiveModel {
        id: Set(demo_household_id()),
        name: Set("Demo Household".to_string()),
        created_at: Set(Utc::now().into()),
    };

    if let Err(e) = household.insert(db).await {
        eprintln!("Failed to insert demo household: {e}");
    } else {
        println!("  Created demo household");
    }
}

/// Seeds three demo members.
async fn seed_members(db: &DatabaseConnection) {
    for (index, name) in ["Alice", "Bob", "Carol"].iter().enumerate() {
        let id = demo_member_id(index);
        if members::Entity::find_by_id(id)
            .one(db)
            .await
            .ok()
            .flatten()
            .is_some()
        {
            println!("  Member {name} already exists, skipping...");
            continue;
        }

        let member = members::ActiveModel {
            id: Set(id),
            household_id: Set(demo_household_id()),
            name: Set((*name).to_string()),
            created_at: Set(Utc::now().into()),
        };

        if let Err(e) = member.insert(db).await {
            eprintln!("Failed to insert member {name}: {e}");
        } else {
            println!("  Created member: {name}");
        }
    }
}

/// Seeds a few shared expenses in the current month, each paid by one member
/// and split across the other two.
async fn seed_expenses(db: &DatabaseConnection) {
    let today = Utc::now().date_naive();
    let month_start =
        NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("valid month start");

    let expenses: [(&str, Decimal, usize, Decimal); 3] = [
        ("Groceries", dec!(90.00), 0, dec!(30.00)),
        ("Utilities", dec!(120.00), 1, dec!(40.00)),
        ("Internet", dec!(60.00), 2, dec!(20.00)),
    ];

    for (description, total, payer_index, share) in expenses {
        let payer = demo_member_id(payer_index);
        let entry = expense_entries::ActiveModel {
            id: Set(Uuid::new_v4()),
            household_id: Set(demo_household_id()),
            entry_type: Set(EntryType::Expense),
            entry_date: Set(month_start),
            description: Set(description.to_string()),
            amount: Set(total),
            payer_id: Set(Some(payer)),
            created_at: Set(Utc::now().into()),
            deleted_at: Set(None),
        };

        let entry = match entry.insert(db).await {
            Ok(entry) => entry,
            Err(e) => {
                eprintln!("Failed to insert expense {description}: {e}");
                continue;
            }
        };

        for index in 0..3 {
            let debtor = demo_member_id(index);
            if debtor == payer {
                continue;
            }
            let split = expense_splits::ActiveModel {
                id: Set(Uuid::new_v4()),
                entry_id: Set(entry.id),
                creditor_id: Set(payer),
                debtor_id: Set(debtor),
                amount: Set(share),
                created_at: Set(Utc::now().into()),
            };
            if let Err(e) = split.insert(db).await {
                eprintln!("Failed to insert split for {description}: {e}");
            }
        }

        println!("  Created expense: {description}");
    }
}
