// shoebox_admin/src/db/mod.rs

pub mod product_store;
pub mod schema;

pub use product_store::PgProductStore;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Opens the process-wide pool. It is bounded and times out both acquires and
/// idle connections, so storage steps see pool pressure as transient faults.
pub async fn connect(config: &AppConfig) -> Result<PgPool> {
  let url = config
    .database_url
    .as_deref()
    .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
  let pool = PgPoolOptions::new()
    .max_connections(config.db_max_connections)
    .acquire_timeout(config.db_connect_timeout)
    .idle_timeout(config.db_idle_timeout)
    .connect(url)
    .await?;
  Ok(pool)
}
