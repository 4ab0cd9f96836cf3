// shoebox/src/catalog/service.rs

//! Read and delete operations over an injected [`ProductStore`].

use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

use crate::catalog::model::Product;
use crate::catalog::store::ProductStore;
use crate::error::{CatalogError, CatalogResult};
use crate::retry::{run_with_retry, RetryPolicy};

#[derive(Clone)]
pub struct Catalog {
  store: Arc<dyn ProductStore>,
  retry: RetryPolicy,
}

impl Catalog {
  pub fn new(store: Arc<dyn ProductStore>, retry: RetryPolicy) -> Self {
    Self { store, retry }
  }

  #[instrument(name = "Catalog::list", skip(self), err(Display))]
  pub async fn list(&self) -> CatalogResult<Vec<Product>> {
    let store = &self.store;
    let products = run_with_retry(&self.retry, "list_products", move || async move {
      store.list().await.map_err(CatalogError::from)
    })
    .await?;
    event!(Level::DEBUG, count = products.len(), "Products listed.");
    Ok(products)
  }

  #[instrument(name = "Catalog::get", skip(self), err(Display))]
  pub async fn get(&self, id: Uuid) -> CatalogResult<Product> {
    let store = &self.store;
    run_with_retry(&self.retry, "find_product", move || async move {
      store.find(id).await.map_err(CatalogError::from)
    })
    .await?
    .ok_or(CatalogError::NotFound { id })
  }

  /// Removes the row only. Images it references are left in their store.
  #[instrument(name = "Catalog::delete_by_id", skip(self), err(Display))]
  pub async fn delete_by_id(&self, id: Uuid) -> CatalogResult<()> {
    let store = &self.store;
    let deleted = run_with_retry(&self.retry, "delete_product", move || async move {
      store.delete(id).await.map_err(CatalogError::from)
    })
    .await?;
    if !deleted {
      event!(Level::WARN, %id, "Delete requested for unknown product.");
      return Err(CatalogError::NotFound { id });
    }
    event!(Level::INFO, %id, "Product deleted.");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::memory::MemoryProductStore;
  use crate::catalog::model::NewProduct;
  use rust_decimal::Decimal;

  fn catalog_with_store() -> (Catalog, Arc<MemoryProductStore>) {
    let store = Arc::new(MemoryProductStore::new());
    (Catalog::new(store.clone(), RetryPolicy::default()), store)
  }

  #[tokio::test]
  async fn delete_unknown_id_is_not_found_without_side_effects() {
    let (catalog, store) = catalog_with_store();
    let draft = NewProduct {
      name: "Chuck Taylor All Star".to_string(),
      brand: "Converse".to_string(),
      category: "Casual".to_string(),
      price: Decimal::new(5999, 2),
      description: "Canvas classic.".to_string(),
      ..Default::default()
    };
    store.insert_product(&draft.record()).await.unwrap();

    let result = catalog.delete_by_id(Uuid::new_v4()).await;
    assert!(matches!(result, Err(CatalogError::NotFound { .. })));
    assert_eq!(store.len(), 1);
  }

  #[tokio::test]
  async fn get_missing_product_is_not_found() {
    let (catalog, _) = catalog_with_store();
    assert!(matches!(catalog.get(Uuid::new_v4()).await, Err(CatalogError::NotFound { .. })));
  }
}
