//! Schema migrations, enabled by the `migration` feature.
//!
//! ```no_run
//! use bulletin::migration::{Migrator, MigratorTrait};
//!
//! # async fn example(conn: sea_orm::DatabaseConnection) -> Result<(), sea_orm::DbErr> {
//! Migrator::up(&conn, None).await?;
//! # Ok(())
//! # }
//! ```

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_session_table;
mod m20240101_000002_create_posting_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Kept apart from any migration table the host application runs
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("bulletin_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_session_table::Migration),
            Box::new(m20240101_000002_create_posting_tables::Migration),
        ]
    }
}
