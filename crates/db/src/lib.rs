//! Persistence for the store back office.
//!
//! - [`store`] -- the traits services are written against.
//! - [`repositories`] -- PostgreSQL implementation ([`PgStore`]).
//! - [`memory`] -- in-process implementation ([`MemoryStore`]).
//! - [`seed`] -- idempotent demo data for either backend.

use sqlx::postgres::PgPoolOptions;

pub mod error;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod seed;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use repositories::PgStore;
pub use store::{AccountStore, BranchStore, EmployeeStore, MemberStore, ResignOutcome, Store, UpdateOutcome};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
