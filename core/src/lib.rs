// shoebox/src/lib.rs

//! Shoebox: the write path of a small product catalog.
//!
//! Products are persisted through named, sequential pipeline steps:
//!  - Each storage step runs under a retry policy with exponential backoff that
//!    retries only failures classified as transient.
//!  - Uploaded images are downscaled, re-encoded and turned into references by
//!    an injected image store before any row is written.
//!  - Updates release the main image they replace, after the new record is
//!    stored and without ever failing the update over it.
//!
//! Reads and deletes go through [`Catalog`]; creates and updates through
//! [`ProductWriter`]. Both take their storage as an injected `Arc<dyn ProductStore>`.

pub mod catalog;
pub mod core;
pub mod error;
pub mod intake;
pub mod pipeline;
pub mod retry;
pub mod writer;

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::pipeline::definition::Pipeline;

pub use crate::catalog::{
  Catalog, DeleteOutcome, Failure, ListOutcome, MemoryProductStore, NewProduct, Product, ProductChanges, ProductStore,
  StoreFault, WriteOutcome,
};
pub use crate::error::{CatalogError, CatalogResult, ErrorKind};
pub use crate::intake::{DirectoryImageStore, EmbeddedImageStore, ImageIntake, ImageStore, IncomingFile, IntakeConfig};
pub use crate::retry::{run_with_retry, RetryPolicy, Retryable};
pub use crate::writer::{release_best_effort, CreateMode, ImageUploads, ProductWriter, WriterConfig};
