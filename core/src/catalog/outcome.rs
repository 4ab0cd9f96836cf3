// shoebox/src/catalog/outcome.rs

//! Result envelopes handed to callers: either the value or a structured failure,
//! never both.

use serde::Serialize;

use crate::catalog::model::Product;
use crate::error::{CatalogError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
  pub message: String,
  pub kind: ErrorKind,
}

impl From<&CatalogError> for Failure {
  fn from(err: &CatalogError) -> Self {
    Self {
      message: err.to_string(),
      kind: err.kind(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteOutcome {
  pub product: Option<Product>,
  pub error: Option<Failure>,
}

impl From<Result<Product, CatalogError>> for WriteOutcome {
  fn from(result: Result<Product, CatalogError>) -> Self {
    match result {
      Ok(product) => Self {
        product: Some(product),
        error: None,
      },
      Err(err) => Self {
        product: None,
        error: Some((&err).into()),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteOutcome {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<Failure>,
}

impl From<Result<(), CatalogError>> for DeleteOutcome {
  fn from(result: Result<(), CatalogError>) -> Self {
    match result {
      Ok(()) => Self {
        success: true,
        error: None,
      },
      Err(err) => Self {
        success: false,
        error: Some((&err).into()),
      },
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListOutcome {
  pub products: Vec<Product>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<Failure>,
}

impl From<Result<Vec<Product>, CatalogError>> for ListOutcome {
  fn from(result: Result<Vec<Product>, CatalogError>) -> Self {
    match result {
      Ok(products) => Self {
        products,
        error: None,
      },
      Err(err) => Self {
        products: Vec::new(),
        error: Some((&err).into()),
      },
    }
  }
}
