// shoebox/src/error.rs
use anyhow::Error as AnyhowError;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::store::StoreFault;
use crate::retry::Retryable;

/// Coarse classification of a [`CatalogError`], reported to callers next to the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
  #[serde(rename = "ValidationError")]
  Validation,
  #[serde(rename = "NotFound")]
  NotFound,
  #[serde(rename = "TransientStorageError")]
  TransientStorage,
  #[serde(rename = "PermanentStorageError")]
  PermanentStorage,
  #[serde(rename = "ImageDecodeError")]
  ImageDecode,
  #[serde(rename = "ImageStoreError")]
  ImageStore,
  #[serde(rename = "InternalError")]
  Internal,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorKind::Validation => "ValidationError",
      ErrorKind::NotFound => "NotFound",
      ErrorKind::TransientStorage => "TransientStorageError",
      ErrorKind::PermanentStorage => "PermanentStorageError",
      ErrorKind::ImageDecode => "ImageDecodeError",
      ErrorKind::ImageStore => "ImageStoreError",
      ErrorKind::Internal => "InternalError",
    }
  }
}

impl std::fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Error)]
pub enum CatalogError {
  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Product not found: {id}")]
  NotFound { id: Uuid },

  #[error("Transient storage failure: {source}")]
  TransientStorage {
    #[source]
    source: StoreFault,
  },

  #[error("Storage failure: {source}")]
  PermanentStorage {
    #[source]
    source: StoreFault,
  },

  #[error("Image '{file_name}' could not be decoded: {source}")]
  ImageDecode {
    file_name: String,
    #[source]
    source: image::ImageError,
  },

  #[error("Image store failure: {source}")]
  ImageStore {
    #[source]
    source: AnyhowError,
  },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl CatalogError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      CatalogError::Validation(_) => ErrorKind::Validation,
      CatalogError::NotFound { .. } => ErrorKind::NotFound,
      CatalogError::TransientStorage { .. } => ErrorKind::TransientStorage,
      CatalogError::PermanentStorage { .. } => ErrorKind::PermanentStorage,
      CatalogError::ImageDecode { .. } => ErrorKind::ImageDecode,
      CatalogError::ImageStore { .. } => ErrorKind::ImageStore,
      CatalogError::HandlerMissing { .. } | CatalogError::Internal(_) => ErrorKind::Internal,
    }
  }
}

// Storage faults are classified once, at the boundary where they enter the catalog.
impl From<StoreFault> for CatalogError {
  fn from(fault: StoreFault) -> Self {
    if fault.is_retryable() {
      CatalogError::TransientStorage { source: fault }
    } else {
      CatalogError::PermanentStorage { source: fault }
    }
  }
}

impl Retryable for CatalogError {
  fn is_retryable(&self) -> bool {
    matches!(self, CatalogError::TransientStorage { .. })
  }
}

pub type CatalogResult<T, E = CatalogError> = std::result::Result<T, E>;
