// shoebox/src/catalog/memory.rs

//! In-process [`ProductStore`] with the same observable semantics as the
//! relational backend. Each call is atomic on its own; nothing spans calls.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::catalog::model::{Product, ProductArrays, ProductRecord, ProductSkeleton, ScalarFields};
use crate::catalog::store::{ProductStore, StoreFault};

#[derive(Debug, Default)]
pub struct MemoryProductStore {
  rows: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.rows.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.read().is_empty()
  }

  fn insert_row(&self, skeleton: &ProductSkeleton, image: Option<String>, arrays: ProductArrays) -> Uuid {
    let id = Uuid::new_v4();
    let row = Product {
      id,
      name: skeleton.name.clone(),
      brand: skeleton.brand.clone(),
      category: skeleton.category.clone(),
      description: skeleton.description.clone(),
      price: skeleton.price,
      features: arrays.features,
      image,
      images: arrays.images,
      sizes: arrays.sizes,
      colors: arrays.colors,
      rating: skeleton.rating,
      review_count: skeleton.review_count,
      in_stock: skeleton.in_stock,
      is_new: skeleton.is_new,
      created_at: Utc::now(),
    };
    self.rows.write().insert(id, row);
    id
  }

  fn modify(&self, id: Uuid, f: impl FnOnce(&mut Product)) -> bool {
    match self.rows.write().get_mut(&id) {
      Some(row) => {
        f(row);
        true
      }
      None => false,
    }
  }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
  async fn insert_skeleton(&self, skeleton: &ProductSkeleton) -> Result<Uuid, StoreFault> {
    Ok(self.insert_row(skeleton, None, ProductArrays::default()))
  }

  async fn insert_product(&self, record: &ProductRecord) -> Result<Uuid, StoreFault> {
    Ok(self.insert_row(&record.skeleton, record.image.clone(), record.arrays.clone()))
  }

  async fn set_image(&self, id: Uuid, image: Option<&str>) -> Result<bool, StoreFault> {
    Ok(self.modify(id, |row| row.image = image.map(str::to_string)))
  }

  async fn set_arrays(&self, id: Uuid, arrays: &ProductArrays) -> Result<bool, StoreFault> {
    Ok(self.modify(id, |row| {
      row.features = arrays.features.clone();
      row.images = arrays.images.clone();
      row.sizes = arrays.sizes.clone();
      row.colors = arrays.colors.clone();
    }))
  }

  async fn update_scalars(&self, id: Uuid, fields: &ScalarFields) -> Result<bool, StoreFault> {
    Ok(self.modify(id, |row| {
      row.name = fields.name.clone();
      row.brand = fields.brand.clone();
      row.category = fields.category.clone();
      row.price = fields.price;
      row.description = fields.description.clone();
      row.image = fields.image.clone();
      row.rating = fields.rating;
      row.review_count = fields.review_count;
      row.in_stock = fields.in_stock;
      row.is_new = fields.is_new;
    }))
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreFault> {
    Ok(self.rows.read().get(&id).cloned())
  }

  async fn list(&self) -> Result<Vec<Product>, StoreFault> {
    Ok(self.rows.read().values().cloned().collect())
  }

  async fn delete(&self, id: Uuid) -> Result<bool, StoreFault> {
    Ok(self.rows.write().remove(&id).is_some())
  }
}
