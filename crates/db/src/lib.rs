//! Relational store for the explorer: diesel schema, row models, and the
//! small per-table repositories the indexer composes inside its per-slot
//! transactions.

pub mod error;
pub mod models;
pub mod repo;
pub mod schema;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_async::pooled_connection::bb8::Pool;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::*;

pub use error::DbError;

pub type DbPool = Pool<AsyncPgConnection>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Builds the write pool against the primary.  Replica URLs from the config
/// belong to the read-side API service, not to the indexer.
pub async fn connect(
    database_url: &str,
    max_open_conns: u32,
    max_idle_conns: u32,
) -> Result<DbPool, DbError> {
    let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_open_conns)
        .min_idle(Some(max_idle_conns))
        .build(manager)
        .await
        .map_err(|e| DbError::Pool(e.to_string()))?;

    Ok(pool)
}

/// Applies any pending embedded migrations.  Diesel's migration harness is
/// synchronous, so this runs on the blocking pool through the async
/// connection wrapper.
pub async fn run_migrations(database_url: &str) -> Result<(), DbError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || -> Result<(), DbError> {
        use diesel::Connection;

        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&url)?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        if !applied.is_empty() {
            info!(count = applied.len(), "applied schema migrations");
        }
        Ok(())
    })
    .await
    .map_err(|e| DbError::Migration(format!("migration task failed: {e}")))?
}
