// shoebox_admin/src/db/product_store.rs

//! [`ProductStore`] over the Postgres `products` table. Every method is one
//! statement; nothing here opens a transaction.

use async_trait::async_trait;
use shoebox::catalog::model::{ProductArrays, ProductRecord, ProductSkeleton, ScalarFields};
use shoebox::{Product, ProductStore, StoreFault};
use sqlx::PgPool;
use tracing::{event, Level};
use uuid::Uuid;

use crate::models::product_row::{ProductRow, PRODUCT_COLUMNS};

#[derive(Clone)]
pub struct PgProductStore {
  pool: PgPool,
}

impl PgProductStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

/// Translates a driver error into the fault shape the catalog classifies.
pub(crate) fn fault_from_sqlx(err: sqlx::Error) -> StoreFault {
  let fault = match &err {
    sqlx::Error::Database(db) => {
      let fault = StoreFault::new(db.message());
      match db.code() {
        Some(code) => fault.with_code(code),
        None => fault,
      }
    }
    sqlx::Error::PoolTimedOut => {
      StoreFault::new("timed out acquiring a database connection").with_code("POOL_TIMEOUT")
    }
    sqlx::Error::Io(io) => StoreFault::new("database I/O failure")
      .caused_by(StoreFault::new(io.to_string()).with_code(format!("{:?}", io.kind()).to_uppercase())),
    other => StoreFault::new(other.to_string()),
  };
  event!(Level::DEBUG, error = %err, code = ?fault.code, "Database call failed.");
  fault
}

#[async_trait]
impl ProductStore for PgProductStore {
  async fn insert_skeleton(&self, skeleton: &ProductSkeleton) -> Result<Uuid, StoreFault> {
    sqlx::query_scalar::<_, Uuid>(
      "INSERT INTO products (name, brand, category, price, description, rating, review_count, in_stock, is_new) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING id",
    )
    .bind(&skeleton.name)
    .bind(&skeleton.brand)
    .bind(&skeleton.category)
    .bind(skeleton.price)
    .bind(&skeleton.description)
    .bind(skeleton.rating)
    .bind(skeleton.review_count)
    .bind(skeleton.in_stock)
    .bind(skeleton.is_new)
    .fetch_one(&self.pool)
    .await
    .map_err(fault_from_sqlx)
  }

  async fn insert_product(&self, record: &ProductRecord) -> Result<Uuid, StoreFault> {
    let skeleton = &record.skeleton;
    sqlx::query_scalar::<_, Uuid>(
      "INSERT INTO products (name, brand, category, price, description, rating, review_count, in_stock, is_new, \
       image, features, images, sizes, colors) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
    )
    .bind(&skeleton.name)
    .bind(&skeleton.brand)
    .bind(&skeleton.category)
    .bind(skeleton.price)
    .bind(&skeleton.description)
    .bind(skeleton.rating)
    .bind(skeleton.review_count)
    .bind(skeleton.in_stock)
    .bind(skeleton.is_new)
    .bind(record.image.as_deref())
    .bind(&record.arrays.features)
    .bind(&record.arrays.images)
    .bind(&record.arrays.sizes)
    .bind(&record.arrays.colors)
    .fetch_one(&self.pool)
    .await
    .map_err(fault_from_sqlx)
  }

  async fn set_image(&self, id: Uuid, image: Option<&str>) -> Result<bool, StoreFault> {
    let result = sqlx::query("UPDATE products SET image = $1 WHERE id = $2")
      .bind(image)
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(fault_from_sqlx)?;
    Ok(result.rows_affected() > 0)
  }

  async fn set_arrays(&self, id: Uuid, arrays: &ProductArrays) -> Result<bool, StoreFault> {
    let result = sqlx::query("UPDATE products SET features = $1, images = $2, sizes = $3, colors = $4 WHERE id = $5")
      .bind(&arrays.features)
      .bind(&arrays.images)
      .bind(&arrays.sizes)
      .bind(&arrays.colors)
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(fault_from_sqlx)?;
    Ok(result.rows_affected() > 0)
  }

  async fn update_scalars(&self, id: Uuid, fields: &ScalarFields) -> Result<bool, StoreFault> {
    let result = sqlx::query(
      "UPDATE products SET name = $1, brand = $2, category = $3, price = $4, description = $5, image = $6, \
       rating = $7, review_count = $8, in_stock = $9, is_new = $10 WHERE id = $11",
    )
    .bind(&fields.name)
    .bind(&fields.brand)
    .bind(&fields.category)
    .bind(fields.price)
    .bind(&fields.description)
    .bind(fields.image.as_deref())
    .bind(fields.rating)
    .bind(fields.review_count)
    .bind(fields.in_stock)
    .bind(fields.is_new)
    .bind(id)
    .execute(&self.pool)
    .await
    .map_err(fault_from_sqlx)?;
    Ok(result.rows_affected() > 0)
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreFault> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(fault_from_sqlx)?;
    Ok(row.map(Product::from))
  }

  async fn list(&self) -> Result<Vec<Product>, StoreFault> {
    let rows: Vec<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products", PRODUCT_COLUMNS))
      .fetch_all(&self.pool)
      .await
      .map_err(fault_from_sqlx)?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn delete(&self, id: Uuid) -> Result<bool, StoreFault> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await
      .map_err(fault_from_sqlx)?;
    Ok(result.rows_affected() > 0)
  }
}
