//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration. The schema builder DSL is
//! used instead of raw SQL so the same migrations run on Postgres in
//! production and on in-memory SQLite in tests.

pub use sea_orm_migration::prelude::*;

mod m20260815_000001_initial;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260815_000001_initial::Migration)]
    }
}
