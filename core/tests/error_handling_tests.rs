// tests/error_handling_tests.rs
mod common;

use common::*;
use shoebox::retry::Retryable;
use shoebox::{CatalogError, DeleteOutcome, ErrorKind, ListOutcome, StoreFault, WriteOutcome};
use serde_json::json;
use uuid::Uuid;

#[test]
fn store_faults_are_classified_on_entry() {
  assert!(matches!(CatalogError::from(transient_fault()), CatalogError::TransientStorage { .. }));
  assert!(matches!(CatalogError::from(permanent_fault()), CatalogError::PermanentStorage { .. }));

  let by_code = StoreFault::new("canceling statement").with_code("ETIMEDOUT");
  assert!(CatalogError::from(by_code).is_retryable());
}

#[test]
fn only_one_level_of_cause_is_inspected() {
  let wrapped = StoreFault::new("query failed").caused_by(StoreFault::new("Connection terminated"));
  assert!(wrapped.is_retryable());

  let buried = StoreFault::new("query failed")
    .caused_by(StoreFault::new("pool error").caused_by(StoreFault::new("Connection terminated")));
  assert!(!buried.is_retryable());
}

#[test]
fn non_storage_errors_are_never_retryable() {
  let errors = [
    CatalogError::Validation("name is required".to_string()),
    CatalogError::NotFound { id: Uuid::nil() },
    CatalogError::Internal("connection timeout".to_string()),
  ];
  for err in errors {
    assert!(!err.is_retryable(), "{} should not be retried", err);
  }
}

#[test]
fn kinds_serialize_with_their_public_names() {
  assert_eq!(serde_json::to_value(ErrorKind::TransientStorage).unwrap(), json!("TransientStorageError"));
  assert_eq!(CatalogError::NotFound { id: Uuid::nil() }.kind().as_str(), "NotFound");
  assert_eq!(
    CatalogError::HandlerMissing { step_name: "x".to_string() }.kind(),
    ErrorKind::Internal
  );
}

#[test]
fn outcomes_carry_either_a_value_or_an_error() {
  let failed = WriteOutcome::from(Err(CatalogError::from(permanent_fault())));
  assert!(failed.product.is_none());
  let failure = failed.error.expect("error present");
  assert_eq!(failure.kind, ErrorKind::PermanentStorage);
  assert!(failure.message.contains("duplicate key"));

  let deleted = serde_json::to_value(DeleteOutcome::from(Ok(()))).unwrap();
  assert_eq!(deleted, json!({ "success": true }));

  let missing = serde_json::to_value(DeleteOutcome::from(Err(CatalogError::NotFound { id: Uuid::nil() }))).unwrap();
  assert_eq!(missing["success"], json!(false));
  assert_eq!(missing["error"]["kind"], json!("NotFound"));

  let listed = serde_json::to_value(ListOutcome::from(Ok(Vec::new()))).unwrap();
  assert_eq!(listed, json!({ "products": [] }));
}
