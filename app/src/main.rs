// shoebox_admin/src/main.rs

mod config;
mod db;
mod errors;
mod models;
mod seed;
mod state;
mod web;

use crate::config::{AppConfig, StoreBackend};
use crate::db::PgProductStore;
use crate::state::AppState;

use actix_web::{web as actix_data, App, HttpServer};
use shoebox::{MemoryProductStore, ProductStore};
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting shoebox catalog server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Failed to load configuration", e))?);

  let store: Arc<dyn ProductStore> = match app_config.store_backend {
    StoreBackend::Postgres => {
      let pool = db::connect(&app_config)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
      tracing::info!("Successfully connected to the database.");
      db::schema::ensure_schema(&pool)
        .await
        .map_err(|e| startup_error("Failed to prepare the schema", e))?;
      Arc::new(PgProductStore::new(pool))
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory product store; nothing survives a restart.");
      Arc::new(MemoryProductStore::new())
    }
  };

  let app_state = AppState::build(app_config.clone(), store);

  if app_config.seed_db {
    if let Err(e) = seed::seed_if_empty(&app_state).await {
      tracing::error!(error = %e, "Failed to seed the catalog.");
    }
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!(base_url = %app_config.app_base_url, "Attempting to bind server to {}...", server_address);
  let json_limit = app_config.max_upload_bytes;

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(actix_data::JsonConfig::default().limit(json_limit))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
