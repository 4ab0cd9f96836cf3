// shoebox_admin/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use shoebox::{CatalogError, ErrorKind, Failure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("{source}")]
  Catalog {
    #[from]
    source: CatalogError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

/// HTTP status reported for a failed catalog operation of this kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
  match kind {
    ErrorKind::Validation => StatusCode::BAD_REQUEST,
    ErrorKind::NotFound => StatusCode::NOT_FOUND,
    ErrorKind::ImageDecode => StatusCode::UNPROCESSABLE_ENTITY,
    ErrorKind::TransientStorage => StatusCode::SERVICE_UNAVAILABLE,
    ErrorKind::ImageStore => StatusCode::BAD_GATEWAY,
    ErrorKind::PermanentStorage | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Catalog { source } => status_for(source.kind()),
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::NotFound(m) => failure_response(status, m.clone(), ErrorKind::NotFound),
      AppError::Catalog { source } => {
        let failure = Failure::from(source);
        HttpResponse::build(status).json(json!({ "error": failure }))
      }
      AppError::Config(m) => HttpResponse::build(status).json(json!({"error": "Configuration issue", "detail": m})),
      AppError::Sqlx(_) => HttpResponse::build(status).json(json!({"error": "Database operation failed"})),
      AppError::Internal(m) => {
        HttpResponse::build(status).json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

fn failure_response(status: StatusCode, message: String, kind: ErrorKind) -> HttpResponse {
  let failure = Failure { message, kind };
  HttpResponse::build(status).json(json!({ "error": failure }))
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
