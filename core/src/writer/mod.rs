// shoebox/src/writer/mod.rs

//! The product write path: create and update pipelines behind one facade.

pub mod contexts;
mod create;
mod update;

pub use contexts::{CreateCtxData, ImageUploads, UpdateCtxData};

use std::str::FromStr;
use std::sync::Arc;
use tracing::{event, instrument, Level};
use uuid::Uuid;

use crate::catalog::model::{NewProduct, Product, ProductChanges};
use crate::catalog::store::ProductStore;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineResult;
use crate::error::{CatalogError, CatalogResult};
use crate::intake::ImageIntake;
use crate::pipeline::Pipeline;
use crate::retry::RetryPolicy;

/// How a create is written to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateMode {
  /// One insert carrying every column.
  #[default]
  Atomic,
  /// Insert, then image, then arrays. Readers may observe the partial record.
  Staged,
}

impl FromStr for CreateMode {
  type Err = CatalogError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "atomic" => Ok(Self::Atomic),
      "staged" => Ok(Self::Staged),
      other => Err(CatalogError::Validation(format!(
        "unknown create mode '{}', expected 'atomic' or 'staged'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterConfig {
  /// Applied to every storage step of both pipelines.
  pub retry: RetryPolicy,
  pub create_mode: CreateMode,
}

impl Default for WriterConfig {
  fn default() -> Self {
    Self {
      retry: RetryPolicy::patient(),
      create_mode: CreateMode::default(),
    }
  }
}

/// Runs product creates and updates. Cheap to share behind an `Arc`; the
/// pipelines are built once and reused for every call.
pub struct ProductWriter {
  create: Pipeline<CreateCtxData>,
  update: Pipeline<UpdateCtxData>,
  config: WriterConfig,
}

impl ProductWriter {
  pub fn new(store: Arc<dyn ProductStore>, intake: ImageIntake, config: WriterConfig) -> Self {
    Self {
      create: create::build(store.clone(), intake.clone(), &config),
      update: update::build(store, intake, &config),
      config,
    }
  }

  pub fn config(&self) -> &WriterConfig {
    &self.config
  }

  /// Step names of the create pipeline, in execution order.
  pub fn create_steps(&self) -> Vec<&str> {
    self.create.step_names()
  }

  pub fn update_steps(&self) -> Vec<&str> {
    self.update.step_names()
  }

  /// Persists a new product and returns it as stored.
  ///
  /// Uploads are ingested before any row is written. In staged mode a failure
  /// after the first insert leaves the partially written row in place.
  #[instrument(
    name = "ProductWriter::create",
    skip_all,
    fields(name = %draft.name, mode = ?self.config.create_mode),
    err(Display)
  )]
  pub async fn create(&self, draft: NewProduct, uploads: ImageUploads) -> CatalogResult<Product> {
    let ctx = ContextData::new(CreateCtxData::new(draft, uploads));
    finish(self.create.run(ctx.clone()).await?, "create")?;
    let product = ctx.write().product.take();
    let product = product.ok_or_else(|| CatalogError::Internal("create finished without a product".to_string()))?;
    event!(Level::INFO, product_id = %product.id, "Product created.");
    Ok(product)
  }

  /// Applies `changes` and `uploads` to an existing product and returns it as stored.
  ///
  /// A replaced main image is released once the scalar write has stored its
  /// successor; failure to release it is logged and does not fail the update.
  #[instrument(name = "ProductWriter::update", skip_all, fields(product_id = %id), err(Display))]
  pub async fn update(&self, id: Uuid, changes: ProductChanges, uploads: ImageUploads) -> CatalogResult<Product> {
    let ctx = ContextData::new(UpdateCtxData::new(id, changes, uploads));
    finish(self.update.run(ctx.clone()).await?, "update")?;
    let product = ctx.write().product.take();
    let product = product.ok_or_else(|| CatalogError::Internal("update finished without a product".to_string()))?;
    event!(Level::INFO, "Product updated.");
    Ok(product)
  }
}

fn finish(result: PipelineResult, pipeline: &str) -> CatalogResult<()> {
  match result {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(CatalogError::Internal(format!("{} pipeline stopped early", pipeline))),
  }
}

pub(crate) fn assigned_id(id: Option<Uuid>) -> CatalogResult<Uuid> {
  id.ok_or_else(|| CatalogError::Internal("product id was not assigned".to_string()))
}

/// Ingests uploads one at a time, in the order supplied. Returns the main image
/// reference (if a main upload was given) and the additional references.
pub(crate) async fn ingest_all(
  intake: &ImageIntake,
  uploads: ImageUploads,
) -> CatalogResult<(Option<String>, Vec<String>)> {
  let main = match uploads.main {
    Some(file) => Some(intake.ingest(file).await?),
    None => None,
  };
  let mut additional = Vec::with_capacity(uploads.additional.len());
  for file in uploads.additional {
    additional.push(intake.ingest(file).await?);
  }
  Ok((main, additional))
}

/// Releases `reference`, logging instead of returning a failure.
pub async fn release_best_effort(intake: &ImageIntake, reference: &str) {
  match intake.release(reference).await {
    Ok(()) => event!(Level::DEBUG, "Superseded image released."),
    Err(e) => event!(
      Level::WARN,
      error = %e,
      "Failed to release superseded image; the stored object may be orphaned."
    ),
  }
}
