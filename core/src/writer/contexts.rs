// shoebox/src/writer/contexts.rs

//! Data carried through the create and update pipelines.
//! Handlers receive these wrapped in `ContextData`.

use uuid::Uuid;

use crate::catalog::model::{NewProduct, Product, ProductChanges};
use crate::intake::IncomingFile;

/// Files supplied next to a create or update request.
#[derive(Debug, Clone, Default)]
pub struct ImageUploads {
  /// Replaces the main image.
  pub main: Option<IncomingFile>,
  /// Appended to the additional images, in this order.
  pub additional: Vec<IncomingFile>,
}

impl ImageUploads {
  pub fn is_empty(&self) -> bool {
    self.main.is_none() && self.additional.is_empty()
  }
}

#[derive(Debug)]
pub struct CreateCtxData {
  pub draft: NewProduct,
  pub uploads: ImageUploads,
  /// Assigned once, by the insert step.
  pub product_id: Option<Uuid>,
  pub product: Option<Product>,
}

impl CreateCtxData {
  pub fn new(draft: NewProduct, uploads: ImageUploads) -> Self {
    Self {
      draft,
      uploads,
      product_id: None,
      product: None,
    }
  }
}

#[derive(Debug)]
pub struct UpdateCtxData {
  pub id: Uuid,
  pub changes: ProductChanges,
  pub uploads: ImageUploads,
  pub current: Option<Product>,
  /// Main image reference to write.
  pub image: Option<String>,
  /// Additional image references to write.
  pub images: Vec<String>,
  /// Previous main image, released once the new record is written.
  pub superseded_image: Option<String>,
  pub product: Option<Product>,
}

impl UpdateCtxData {
  pub fn new(id: Uuid, changes: ProductChanges, uploads: ImageUploads) -> Self {
    Self {
      id,
      changes,
      uploads,
      current: None,
      image: None,
      images: Vec::new(),
      superseded_image: None,
      product: None,
    }
  }
}
