// shoebox_admin/src/models/product_row.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shoebox::Product;
use sqlx::FromRow;
use uuid::Uuid;

/// Column list shared by every query that reads whole products.
pub const PRODUCT_COLUMNS: &str = "id, name, brand, category, description, price, features, image, images, sizes, \
   colors, rating, review_count, in_stock, is_new, created_at";

/// A `products` row as Postgres returns it. Array columns may be NULL.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
  pub id: Uuid,
  pub name: String,
  pub brand: String,
  pub category: String,
  pub description: String,
  pub price: Decimal,
  pub features: Option<Vec<String>>,
  pub image: Option<String>,
  pub images: Option<Vec<String>>,
  pub sizes: Option<Vec<String>>,
  pub colors: Option<Vec<String>>,
  pub rating: Decimal,
  pub review_count: i32,
  pub in_stock: bool,
  pub is_new: bool,
  pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      brand: row.brand,
      category: row.category,
      description: row.description,
      price: row.price,
      features: row.features.unwrap_or_default(),
      image: row.image,
      images: row.images.unwrap_or_default(),
      sizes: row.sizes.unwrap_or_default(),
      colors: row.colors.unwrap_or_default(),
      rating: row.rating,
      review_count: row.review_count,
      in_stock: row.in_stock,
      is_new: row.is_new,
      created_at: row.created_at,
    }
  }
}
