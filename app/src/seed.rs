// shoebox_admin/src/seed.rs

use rust_decimal::Decimal;
use shoebox::{ImageUploads, NewProduct};
use tracing::{info, instrument};

use crate::errors::Result;
use crate::state::AppState;

fn texts(values: &[&str]) -> Vec<String> {
  values.iter().map(|v| v.to_string()).collect()
}

fn demo_products() -> Vec<NewProduct> {
  vec![
    NewProduct {
      name: "Air Max 270".to_string(),
      brand: "Nike".to_string(),
      category: "Running".to_string(),
      price: Decimal::new(12999, 2),
      description: "The Nike Air Max 270 delivers visible cushioning under every step.".to_string(),
      features: texts(&["Air Max cushioning", "Breathable mesh upper", "Durable rubber outsole"]),
      sizes: texts(&["7", "8", "9", "10", "11", "12"]),
      colors: texts(&["Black", "White", "Red"]),
      rating: Some(Decimal::new(45, 1)),
      review_count: Some(128),
      is_new: Some(false),
      ..Default::default()
    },
    NewProduct {
      name: "Ultraboost 22".to_string(),
      brand: "Adidas".to_string(),
      category: "Running".to_string(),
      price: Decimal::new(18999, 2),
      description: "Experience endless energy with Ultraboost 22 running shoes.".to_string(),
      features: texts(&["Boost midsole", "Primeknit upper", "Continental rubber outsole"]),
      sizes: texts(&["6", "7", "8", "9", "10", "11"]),
      colors: texts(&["White", "Black", "Blue"]),
      rating: Some(Decimal::new(47, 1)),
      review_count: Some(95),
      ..Default::default()
    },
    NewProduct {
      name: "Chuck Taylor All Star".to_string(),
      brand: "Converse".to_string(),
      category: "Casual".to_string(),
      price: Decimal::new(5999, 2),
      description: "The iconic Chuck Taylor All Star sneaker.".to_string(),
      features: texts(&["Canvas upper", "Rubber toe cap", "Classic design"]),
      sizes: texts(&["6", "7", "8", "9", "10", "11", "12", "13"]),
      colors: texts(&["Black", "White", "Red", "Navy"]),
      rating: Some(Decimal::new(43, 1)),
      review_count: Some(256),
      is_new: Some(false),
      ..Default::default()
    },
  ]
}

/// Writes the demo catalog through the regular create path, but only into an empty catalog.
#[instrument(name = "seed::seed_if_empty", skip_all, err(Display))]
pub async fn seed_if_empty(state: &AppState) -> Result<usize> {
  if !state.catalog.list().await?.is_empty() {
    info!("Catalog already has products; skipping seed.");
    return Ok(0);
  }
  let mut created = 0;
  for draft in demo_products() {
    state.writer.create(draft.validate()?, ImageUploads::default()).await?;
    created += 1;
  }
  info!(created, "Demo catalog seeded.");
  Ok(created)
}
