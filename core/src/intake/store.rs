// shoebox/src/intake/store.rs

//! Content stores that turn bytes into image references and back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::PathBuf;
use tracing::{event, Level};
use uuid::Uuid;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[async_trait]
pub trait ImageStore: Send + Sync {
  /// Stores `bytes` and returns a reference that renders without further fetch logic.
  async fn put(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> Result<String>;

  /// Removes the bytes behind a reference this store issued. References from
  /// elsewhere are ignored.
  async fn remove(&self, reference: &str) -> Result<()>;
}

/// Keeps the bytes inside the reference itself as a `data:` URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedImageStore;

impl EmbeddedImageStore {
  /// Splits a `data:<type>;base64,<payload>` reference back into content type and bytes.
  pub fn decode_reference(reference: &str) -> Option<(String, Vec<u8>)> {
    let rest = reference.strip_prefix("data:")?;
    let (content_type, payload) = rest.split_once(";base64,")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((content_type.to_string(), bytes))
  }
}

#[async_trait]
impl ImageStore for EmbeddedImageStore {
  async fn put(&self, bytes: Vec<u8>, content_type: &str, _file_name: &str) -> Result<String> {
    let content_type = if content_type.trim().is_empty() {
      FALLBACK_CONTENT_TYPE
    } else {
      content_type.trim()
    };
    Ok(format!("data:{};base64,{}", content_type, STANDARD.encode(bytes)))
  }

  async fn remove(&self, _reference: &str) -> Result<()> {
    // The reference owns its bytes; dropping it from the record is the removal.
    Ok(())
  }
}

/// Writes objects under a local directory and hands out URLs below `public_base_url`.
#[derive(Debug, Clone)]
pub struct DirectoryImageStore {
  root: PathBuf,
  public_base_url: String,
}

impl DirectoryImageStore {
  pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
    Self {
      root: root.into(),
      public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
    }
  }

  /// Object key behind a reference issued by this store.
  pub fn key_for<'a>(&self, reference: &'a str) -> Option<&'a str> {
    let key = reference.strip_prefix(self.public_base_url.as_str())?.strip_prefix('/')?;
    valid_key(key).then_some(key)
  }

  /// Reads a stored object back. `Ok(None)` when the key is unknown or malformed.
  pub async fn open(&self, key: &str) -> Result<Option<(Vec<u8>, &'static str)>> {
    if !valid_key(key) {
      return Ok(None);
    }
    match tokio::fs::read(self.root.join(key)).await {
      Ok(bytes) => Ok(Some((bytes, content_type_for_key(key)))),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e).with_context(|| format!("reading stored object '{}'", key)),
    }
  }
}

#[async_trait]
impl ImageStore for DirectoryImageStore {
  async fn put(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> Result<String> {
    let key = format!("{}.{}", Uuid::new_v4(), extension_for(content_type, file_name));
    tokio::fs::create_dir_all(&self.root)
      .await
      .with_context(|| format!("creating media directory {}", self.root.display()))?;
    tokio::fs::write(self.root.join(&key), bytes)
      .await
      .with_context(|| format!("writing stored object '{}'", key))?;
    event!(Level::DEBUG, %key, "Object stored.");
    Ok(format!("{}/{}", self.public_base_url, key))
  }

  async fn remove(&self, reference: &str) -> Result<()> {
    let Some(key) = self.key_for(reference) else {
      event!(Level::DEBUG, "Reference was not issued by this store; nothing to remove.");
      return Ok(());
    };
    match tokio::fs::remove_file(self.root.join(key)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(e).with_context(|| format!("removing stored object '{}'", key)),
    }
  }
}

fn valid_key(key: &str) -> bool {
  !key.is_empty()
    && !key.starts_with('.')
    && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn extension_for(content_type: &str, file_name: &str) -> String {
  match content_type.trim().to_ascii_lowercase().as_str() {
    "image/jpeg" | "image/jpg" | "image/pjpeg" => return "jpg".to_string(),
    "image/png" => return "png".to_string(),
    "image/gif" => return "gif".to_string(),
    "image/webp" => return "webp".to_string(),
    _ => {}
  }
  file_name
    .rsplit_once('.')
    .map(|(_, ext)| ext.to_ascii_lowercase())
    .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
    .unwrap_or_else(|| "bin".to_string())
}

fn content_type_for_key(key: &str) -> &'static str {
  match key.rsplit_once('.').map(|(_, ext)| ext) {
    Some("jpg") => "image/jpeg",
    Some("png") => "image/png",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    Some("pdf") => "application/pdf",
    _ => FALLBACK_CONTENT_TYPE,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn embedded_reference_round_trips_bytes() {
    let reference = EmbeddedImageStore.put(vec![1, 2, 3], "image/png", "a.png").await.unwrap();
    assert!(reference.starts_with("data:image/png;base64,"));
    let (content_type, bytes) = EmbeddedImageStore::decode_reference(&reference).unwrap();
    assert_eq!(content_type, "image/png");
    assert_eq!(bytes, vec![1, 2, 3]);
  }

  #[tokio::test]
  async fn directory_store_writes_and_removes_objects() {
    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryImageStore::new(dir.path(), "http://localhost:8080/api/v1/media/");

    let reference = store.put(vec![9; 16], "image/jpeg", "shoe.jpeg").await.unwrap();
    let key = store.key_for(&reference).unwrap().to_string();
    assert!(key.ends_with(".jpg"));
    assert_eq!(store.open(&key).await.unwrap().unwrap().0, vec![9; 16]);

    store.remove(&reference).await.unwrap();
    assert!(store.open(&key).await.unwrap().is_none());
    // Removing twice, or removing a foreign reference, is still a success.
    store.remove(&reference).await.unwrap();
    store.remove("https://cdn.example.com/x.jpg").await.unwrap();
  }

  #[test]
  fn keys_cannot_escape_the_root() {
    let store = DirectoryImageStore::new("/tmp/media", "http://host/media");
    assert!(store.key_for("http://host/media/../etc/passwd").is_none());
    assert!(store.key_for("http://host/media/sub/dir.png").is_none());
    assert_eq!(extension_for("application/pdf", "manual.PDF"), "pdf");
    assert_eq!(extension_for("", "noext"), "bin");
  }
}
