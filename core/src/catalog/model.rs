// shoebox/src/catalog/model.rs

//! Product records and the write-side shapes derived from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::CatalogError;

/// Highest rating a product can carry.
pub const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

/// Largest price a `NUMERIC(10,2)` column holds: 99,999,999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Canonical product record as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub brand: String,
  pub category: String,
  pub description: String,
  pub price: Decimal,
  pub features: Vec<String>,
  pub image: Option<String>,
  pub images: Vec<String>,
  pub sizes: Vec<String>,
  pub colors: Vec<String>,
  pub rating: Decimal,
  pub review_count: i32,
  pub in_stock: bool,
  pub is_new: bool,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a product. Optional numeric and boolean fields fall back
/// to the catalog defaults; array fields are never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
  pub name: String,
  pub brand: String,
  pub category: String,
  pub price: Decimal,
  pub description: String,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub features: Vec<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub images: Vec<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub sizes: Vec<String>,
  #[serde(default, deserialize_with = "null_as_empty")]
  pub colors: Vec<String>,
  #[serde(default)]
  pub rating: Option<Decimal>,
  #[serde(default)]
  pub review_count: Option<i32>,
  #[serde(default)]
  pub in_stock: Option<bool>,
  #[serde(default)]
  pub is_new: Option<bool>,
}

/// Scalar columns written by the first insert of a staged create.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSkeleton {
  pub name: String,
  pub brand: String,
  pub category: String,
  pub price: Decimal,
  pub description: String,
  pub rating: Decimal,
  pub review_count: i32,
  pub in_stock: bool,
  pub is_new: bool,
}

/// The four array columns. A write always replaces all of them wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductArrays {
  pub features: Vec<String>,
  pub images: Vec<String>,
  pub sizes: Vec<String>,
  pub colors: Vec<String>,
}

/// Every column of a new product, for single-statement inserts.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
  pub skeleton: ProductSkeleton,
  pub image: Option<String>,
  pub arrays: ProductArrays,
}

/// Columns rewritten by the scalar write of an update.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarFields {
  pub name: String,
  pub brand: String,
  pub category: String,
  pub price: Decimal,
  pub description: String,
  pub image: Option<String>,
  pub rating: Decimal,
  pub review_count: i32,
  pub in_stock: bool,
  pub is_new: bool,
}

/// Partial replacement of a product. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductChanges {
  pub name: Option<String>,
  pub brand: Option<String>,
  pub category: Option<String>,
  pub price: Option<Decimal>,
  pub description: Option<String>,
  pub features: Option<Vec<String>>,
  /// Explicit main image reference. A main image upload takes precedence.
  pub image: Option<String>,
  /// Retained additional image references; new uploads are appended after them.
  pub images: Option<Vec<String>>,
  pub sizes: Option<Vec<String>>,
  pub colors: Option<Vec<String>>,
  pub rating: Option<Decimal>,
  pub review_count: Option<i32>,
  pub in_stock: Option<bool>,
  pub is_new: Option<bool>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn require_text(field: &str, value: &str) -> Result<String, CatalogError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(CatalogError::Validation(format!("{} is required", field)));
  }
  Ok(trimmed.to_string())
}

fn checked_price(price: Decimal) -> Result<Decimal, CatalogError> {
  if price.is_sign_negative() && !price.is_zero() {
    return Err(CatalogError::Validation("price must not be negative".to_string()));
  }
  let price = price.round_dp(2);
  if price > MAX_PRICE {
    return Err(CatalogError::Validation(format!("price must not exceed {}", MAX_PRICE)));
  }
  Ok(price)
}

fn checked_rating(rating: Option<Decimal>) -> Result<Option<Decimal>, CatalogError> {
  match rating {
    Some(rating) if rating < Decimal::ZERO || rating > MAX_RATING => {
      Err(CatalogError::Validation("rating must be between 0 and 5".to_string()))
    }
    other => Ok(other.map(|r| r.round_dp(2))),
  }
}

fn checked_review_count(count: Option<i32>) -> Result<Option<i32>, CatalogError> {
  if matches!(count, Some(count) if count < 0) {
    return Err(CatalogError::Validation("reviewCount must not be negative".to_string()));
  }
  Ok(count)
}

/// Trims entries and drops the blank ones.
pub fn clean_list(values: Vec<String>) -> Vec<String> {
  values
    .into_iter()
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .collect()
}

/// An image reference that is blank after trimming counts as no reference.
pub fn clean_reference(reference: Option<String>) -> Option<String> {
  reference.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
}

impl NewProduct {
  /// Normalizes the input and rejects values the catalog cannot store.
  pub fn validate(self) -> Result<Self, CatalogError> {
    Ok(Self {
      name: require_text("name", &self.name)?,
      brand: require_text("brand", &self.brand)?,
      category: require_text("category", &self.category)?,
      description: require_text("description", &self.description)?,
      price: checked_price(self.price)?,
      features: clean_list(self.features),
      image: clean_reference(self.image),
      images: clean_list(self.images),
      sizes: clean_list(self.sizes),
      colors: clean_list(self.colors),
      rating: checked_rating(self.rating)?,
      review_count: checked_review_count(self.review_count)?,
      in_stock: self.in_stock,
      is_new: self.is_new,
    })
  }

  pub fn skeleton(&self) -> ProductSkeleton {
    ProductSkeleton {
      name: self.name.clone(),
      brand: self.brand.clone(),
      category: self.category.clone(),
      price: self.price,
      description: self.description.clone(),
      rating: self.rating.unwrap_or(Decimal::ZERO),
      review_count: self.review_count.unwrap_or(0),
      in_stock: self.in_stock.unwrap_or(true),
      is_new: self.is_new.unwrap_or(true),
    }
  }

  pub fn arrays(&self) -> ProductArrays {
    ProductArrays {
      features: self.features.clone(),
      images: self.images.clone(),
      sizes: self.sizes.clone(),
      colors: self.colors.clone(),
    }
  }

  pub fn record(&self) -> ProductRecord {
    ProductRecord {
      skeleton: self.skeleton(),
      image: clean_reference(self.image.clone()),
      arrays: self.arrays(),
    }
  }
}

impl ProductChanges {
  /// Same rules as [`NewProduct::validate`], applied to the fields that are present.
  pub fn validate(self) -> Result<Self, CatalogError> {
    let text = |field: &str, value: Option<String>| value.map(|v| require_text(field, &v)).transpose();
    Ok(Self {
      name: text("name", self.name)?,
      brand: text("brand", self.brand)?,
      category: text("category", self.category)?,
      description: text("description", self.description)?,
      price: self.price.map(checked_price).transpose()?,
      features: self.features.map(clean_list),
      image: self.image.map(|r| r.trim().to_string()),
      images: self.images.map(clean_list),
      sizes: self.sizes.map(clean_list),
      colors: self.colors.map(clean_list),
      rating: checked_rating(self.rating)?,
      review_count: checked_review_count(self.review_count)?,
      in_stock: self.in_stock,
      is_new: self.is_new,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn draft() -> NewProduct {
    NewProduct {
      name: " Air Max 270 ".to_string(),
      brand: "Nike".to_string(),
      category: "Running".to_string(),
      price: Decimal::from_str("129.999").unwrap(),
      description: "Visible cushioning.".to_string(),
      features: vec!["Air cushioning".to_string(), "  ".to_string()],
      ..Default::default()
    }
  }

  #[test]
  fn validate_trims_and_rounds() {
    let product = draft().validate().unwrap();
    assert_eq!(product.name, "Air Max 270");
    assert_eq!(product.price, Decimal::from_str("130.00").unwrap());
    assert_eq!(product.features, vec!["Air cushioning"]);
  }

  #[test]
  fn validate_rejects_blank_and_out_of_range_values() {
    let blank = NewProduct {
      brand: " ".to_string(),
      ..draft()
    };
    assert!(matches!(blank.validate(), Err(CatalogError::Validation(m)) if m.contains("brand")));

    let negative = NewProduct {
      price: Decimal::from_str("-1").unwrap(),
      ..draft()
    };
    assert!(negative.validate().is_err());

    let rating = NewProduct {
      rating: Some(Decimal::from_str("5.5").unwrap()),
      ..draft()
    };
    assert!(rating.validate().is_err());
  }

  #[test]
  fn validate_rejects_prices_beyond_the_column_precision() {
    let largest = NewProduct {
      price: Decimal::from_str("99999999.99").unwrap(),
      ..draft()
    };
    assert_eq!(largest.validate().unwrap().price, MAX_PRICE);

    let too_large = NewProduct {
      price: Decimal::from_str("100000000").unwrap(),
      ..draft()
    };
    assert!(matches!(too_large.validate(), Err(CatalogError::Validation(m)) if m.contains("price")));

    let changes = ProductChanges {
      price: Some(Decimal::from_str("123456789.50").unwrap()),
      ..Default::default()
    };
    assert!(changes.validate().is_err());
  }

  #[test]
  fn changes_carry_rating_counts_and_flags() {
    let json = r#"{"inStock":false,"isNew":false,"rating":"4.5","reviewCount":7}"#;
    let changes: ProductChanges = serde_json::from_str(json).unwrap();
    assert_eq!(changes.in_stock, Some(false));
    assert_eq!(changes.is_new, Some(false));
    assert_eq!(changes.rating, Some(Decimal::from_str("4.5").unwrap()));
    assert_eq!(changes.review_count, Some(7));
    assert!(changes.validate().is_ok());

    let bad = ProductChanges {
      review_count: Some(-1),
      ..Default::default()
    };
    assert!(matches!(bad.validate(), Err(CatalogError::Validation(m)) if m.contains("reviewCount")));
  }

  #[test]
  fn skeleton_applies_defaults() {
    let skeleton = draft().skeleton();
    assert_eq!(skeleton.rating, Decimal::ZERO);
    assert_eq!(skeleton.review_count, 0);
    assert!(skeleton.in_stock);
    assert!(skeleton.is_new);
  }

  #[test]
  fn null_arrays_deserialize_as_empty() {
    let json = r#"{"name":"a","brand":"b","category":"c","price":"1.50","description":"d","features":null}"#;
    let product: NewProduct = serde_json::from_str(json).unwrap();
    assert!(product.features.is_empty());
    assert!(product.sizes.is_empty());
    assert_eq!(product.price, Decimal::from_str("1.50").unwrap());
  }
}
