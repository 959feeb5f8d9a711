// server/src/db/mod.rs

//! PostgreSQL access. Coupons and orders implement the `backstore` store
//! traits; the routine admin tables are plain async functions over the pool.

pub mod admins;
pub mod catalog;
pub mod content;
pub mod coupons;
pub mod dashboard;
pub mod orders;

use backstore::BackstoreError;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{sqlstate, AppError, PG_UNIQUE_VIOLATION};

pub use admins::{AdminStore, PgAdminStore};
pub use coupons::PgCouponStore;
pub use orders::PgOrderStore;

pub async fn connect(config: &AppConfig) -> Result<PgPool, AppError> {
  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(Duration::from_secs(5))
    .connect(&config.database_url)
    .await?;
  info!(max_connections = config.db_max_connections, "Connected to the database.");
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
  info!("Database migrations applied.");
  Ok(())
}

/// Maps a sqlx failure inside a store implementation onto the domain taxonomy.
pub(crate) fn store_error(err: sqlx::Error) -> BackstoreError {
  if sqlstate(&err).as_deref() == Some(PG_UNIQUE_VIOLATION) {
    return BackstoreError::Conflict("A record with the same unique value already exists".to_string());
  }
  BackstoreError::store(err)
}
