// shoebox/src/catalog/store.rs

//! The storage seam of the catalog. Implementations are injected as
//! `Arc<dyn ProductStore>`; each method is a single storage statement.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::catalog::model::{Product, ProductArrays, ProductRecord, ProductSkeleton, ScalarFields};
use crate::retry::{has_transient_signature, Retryable};

/// A raw failure reported by a storage backend, before classification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreFault {
  pub message: String,
  pub code: Option<String>,
  #[source]
  pub cause: Option<Box<StoreFault>>,
}

impl StoreFault {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
      code: None,
      cause: None,
    }
  }

  pub fn with_code(mut self, code: impl Into<String>) -> Self {
    self.code = Some(code.into());
    self
  }

  pub fn caused_by(mut self, cause: StoreFault) -> Self {
    self.cause = Some(Box::new(cause));
    self
  }

  fn own_signature(&self) -> bool {
    has_transient_signature(&self.message, self.code.as_deref())
  }
}

impl Retryable for StoreFault {
  // Only one level of cause is inspected.
  fn is_retryable(&self) -> bool {
    self.own_signature() || self.cause.as_deref().map_or(false, StoreFault::own_signature)
  }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Inserts the scalar columns only and returns the server-generated id.
  async fn insert_skeleton(&self, skeleton: &ProductSkeleton) -> Result<Uuid, StoreFault>;

  /// Inserts every column in one statement and returns the server-generated id.
  async fn insert_product(&self, record: &ProductRecord) -> Result<Uuid, StoreFault>;

  /// Returns false when no row has this id.
  async fn set_image(&self, id: Uuid, image: Option<&str>) -> Result<bool, StoreFault>;

  /// Returns false when no row has this id.
  async fn set_arrays(&self, id: Uuid, arrays: &ProductArrays) -> Result<bool, StoreFault>;

  /// Returns false when no row has this id.
  async fn update_scalars(&self, id: Uuid, fields: &ScalarFields) -> Result<bool, StoreFault>;

  async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreFault>;

  /// Full, unfiltered read. Ordering is unspecified.
  async fn list(&self) -> Result<Vec<Product>, StoreFault>;

  /// Returns false when no row has this id.
  async fn delete(&self, id: Uuid) -> Result<bool, StoreFault>;
}
