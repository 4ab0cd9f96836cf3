// shoebox/src/intake/mod.rs

//! Image intake: turns an uploaded file into a stable reference, and releases
//! references that are no longer needed.

pub mod process;
pub mod store;

pub use process::{EncodedImage, IntakeConfig};
pub use store::{DirectoryImageStore, EmbeddedImageStore, ImageStore};

use std::sync::Arc;
use tracing::{event, instrument, Level};

use crate::error::{CatalogError, CatalogResult};

/// A raw upload as received from the caller.
#[derive(Clone, PartialEq, Eq)]
pub struct IncomingFile {
  pub file_name: String,
  /// Declared content type; decides whether the bytes are treated as an image.
  pub content_type: String,
  pub bytes: Vec<u8>,
}

impl IncomingFile {
  pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
    Self {
      file_name: file_name.into(),
      content_type: content_type.into(),
      bytes,
    }
  }
}

impl std::fmt::Debug for IncomingFile {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("IncomingFile")
      .field("file_name", &self.file_name)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

#[derive(Clone)]
pub struct ImageIntake {
  store: Arc<dyn ImageStore>,
  config: IntakeConfig,
}

impl ImageIntake {
  pub fn new(store: Arc<dyn ImageStore>, config: IntakeConfig) -> Self {
    Self { store, config }
  }

  /// Stores the upload and returns its reference. Images are downscaled and
  /// re-encoded first; anything else is stored verbatim.
  #[instrument(
    name = "ImageIntake::ingest",
    skip_all,
    fields(file_name = %file.file_name, content_type = %file.content_type, size = file.bytes.len()),
    err(Display)
  )]
  pub async fn ingest(&self, file: IncomingFile) -> CatalogResult<String> {
    let file_name = file.file_name.clone();
    let (bytes, content_type) = if process::is_image(&file.content_type) {
      let config = self.config;
      let encoded = tokio::task::spawn_blocking(move || process::downscale(&file, &config))
        .await
        .map_err(|e| CatalogError::Internal(format!("image worker failed: {}", e)))??;
      event!(
        Level::DEBUG,
        width = encoded.width,
        height = encoded.height,
        encoded_size = encoded.bytes.len(),
        "Image re-encoded."
      );
      (encoded.bytes, encoded.content_type.to_string())
    } else {
      (file.bytes, file.content_type)
    };

    let reference = self
      .store
      .put(bytes, &content_type, &file_name)
      .await
      .map_err(|source| CatalogError::ImageStore { source })?;
    event!(Level::INFO, reference_len = reference.len(), "Upload stored.");
    Ok(reference)
  }

  /// Removes the bytes behind `reference`. Callers decide whether a failure matters.
  #[instrument(name = "ImageIntake::release", skip_all, err(Display))]
  pub async fn release(&self, reference: &str) -> CatalogResult<()> {
    self
      .store
      .remove(reference)
      .await
      .map_err(|source| CatalogError::ImageStore { source })
  }
}
