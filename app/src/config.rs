// shoebox_admin/src/config.rs

use crate::errors::{AppError, Result};
use crate::web::forms::UploadLimits;
use dotenvy::dotenv;
use shoebox::{CreateMode, IntakeConfig, RetryPolicy, WriterConfig};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
  /// References are `data:` URLs kept in the row itself.
  Embedded,
  /// Files under `media_dir`, served from `media_base_url`.
  Directory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub app_base_url: String,

  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub db_connect_timeout: Duration,
  pub db_idle_timeout: Duration,

  pub image_backend: ImageBackend,
  pub media_dir: PathBuf,
  pub media_base_url: String,
  pub intake: IntakeConfig,
  pub max_upload_bytes: usize,
  /// Cap on the sum of every multipart part in one request.
  pub max_request_bytes: usize,
  pub max_image_files: usize,

  pub retry: RetryPolicy,
  pub create_mode: CreateMode,

  pub seed_db: bool,
}

fn parsed<T>(var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match env::var(var_name) {
    Ok(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    Err(_) => Ok(default),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parsed::<u16>("SERVER_PORT", 8080)?;
    let app_base_url = get_env("APP_BASE_URL").unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let store_backend = match get_env("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("postgres") => StoreBackend::Postgres,
      Some("memory") => StoreBackend::Memory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid STORE_BACKEND '{}', expected 'postgres' or 'memory'",
          other
        )))
      }
    };
    let database_url = get_env("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORE_BACKEND=postgres)".to_string(),
      ));
    }

    let image_backend = match get_env("IMAGE_STORE").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("embedded") => ImageBackend::Embedded,
      Some("directory") => ImageBackend::Directory,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid IMAGE_STORE '{}', expected 'embedded' or 'directory'",
          other
        )))
      }
    };
    let media_base_url = get_env("MEDIA_BASE_URL").unwrap_or_else(|| format!("{}/api/v1/media", app_base_url));

    let intake = IntakeConfig {
      max_width: parsed("IMAGE_MAX_WIDTH", IntakeConfig::default().max_width)?,
      ..IntakeConfig::default()
    };
    if intake.max_width == 0 {
      return Err(AppError::Config("IMAGE_MAX_WIDTH must be positive".to_string()));
    }

    let defaults = RetryPolicy::patient();
    let mut retry = RetryPolicy::new(
      parsed("RETRY_MAX_ATTEMPTS", defaults.max_attempts)?,
      Duration::from_millis(parsed("RETRY_INITIAL_DELAY_MS", defaults.initial_delay.as_millis() as u64)?),
    );
    if let Some(raw) = get_env("RETRY_MAX_DELAY_MS") {
      let cap = raw
        .trim()
        .parse::<u64>()
        .map_err(|e| AppError::Config(format!("Invalid RETRY_MAX_DELAY_MS value '{}': {}", raw, e)))?;
      retry = retry.with_max_delay(Duration::from_millis(cap));
    }

    let create_mode = match get_env("CREATE_MODE") {
      Some(raw) => raw.parse::<CreateMode>().map_err(|e| AppError::Config(e.to_string()))?,
      None => CreateMode::default(),
    };

    let config = Self {
      server_host,
      server_port,
      app_base_url,
      store_backend,
      database_url,
      db_max_connections: parsed("DB_MAX_CONNECTIONS", 5)?,
      db_connect_timeout: Duration::from_secs(parsed("DB_CONNECT_TIMEOUT_SECS", 60)?),
      db_idle_timeout: Duration::from_secs(parsed("DB_IDLE_TIMEOUT_SECS", 120)?),
      image_backend,
      media_dir: PathBuf::from(get_env("MEDIA_DIR").unwrap_or_else(|| "./media".to_string())),
      media_base_url,
      intake,
      max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
      max_request_bytes: parsed("MAX_REQUEST_BYTES", 40 * 1024 * 1024)?,
      max_image_files: parsed("MAX_IMAGE_FILES", 12)?,
      retry,
      create_mode,
      seed_db: parsed("SEED_DB", false)?,
    };

    tracing::info!(
      store = ?config.store_backend,
      images = ?config.image_backend,
      create_mode = ?config.create_mode,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  pub fn upload_limits(&self) -> UploadLimits {
    UploadLimits {
      part_bytes: self.max_upload_bytes,
      total_bytes: self.max_request_bytes.max(self.max_upload_bytes),
      files: self.max_image_files,
    }
  }

  pub fn writer_config(&self) -> WriterConfig {
    WriterConfig {
      retry: self.retry,
      create_mode: self.create_mode,
    }
  }
}

#[cfg(test)]
impl AppConfig {
  /// Memory store, embedded images and a short retry budget.
  pub fn for_tests() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      store_backend: StoreBackend::Memory,
      database_url: None,
      db_max_connections: 1,
      db_connect_timeout: Duration::from_secs(1),
      db_idle_timeout: Duration::from_secs(1),
      image_backend: ImageBackend::Embedded,
      media_dir: PathBuf::from("./media"),
      media_base_url: "http://127.0.0.1:8080/api/v1/media".to_string(),
      intake: IntakeConfig::default(),
      max_upload_bytes: 1024 * 1024,
      max_request_bytes: 2 * 1024 * 1024,
      max_image_files: 4,
      retry: RetryPolicy::new(2, Duration::from_millis(1)),
      create_mode: CreateMode::Atomic,
      seed_db: false,
    }
  }
}
