// shoebox_admin/src/state.rs
use crate::config::{AppConfig, ImageBackend};
use shoebox::{
  Catalog, DirectoryImageStore, EmbeddedImageStore, ImageIntake, ImageStore, ProductStore, ProductWriter,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Catalog,
  pub writer: Arc<ProductWriter>,
  pub config: Arc<AppConfig>,
  /// Present only when images are written to the media directory.
  pub media: Option<DirectoryImageStore>,
}

impl AppState {
  /// Wires the catalog and writer around one product store and the configured image store.
  pub fn build(config: Arc<AppConfig>, store: Arc<dyn ProductStore>) -> Self {
    let (image_store, media): (Arc<dyn ImageStore>, Option<DirectoryImageStore>) = match config.image_backend {
      ImageBackend::Embedded => (Arc::new(EmbeddedImageStore), None),
      ImageBackend::Directory => {
        let directory = DirectoryImageStore::new(config.media_dir.clone(), config.media_base_url.clone());
        (Arc::new(directory.clone()), Some(directory))
      }
    };
    let intake = ImageIntake::new(image_store, config.intake);

    Self {
      catalog: Catalog::new(store.clone(), config.retry),
      writer: Arc::new(ProductWriter::new(store, intake, config.writer_config())),
      config,
      media,
    }
  }
}
