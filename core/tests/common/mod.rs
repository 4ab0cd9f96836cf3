// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shoebox::catalog::model::{Product, ProductArrays, ProductRecord, ProductSkeleton, ScalarFields};
use shoebox::{
  CatalogError, ContextData, EmbeddedImageStore, ImageIntake, ImageStore, IncomingFile, IntakeConfig,
  MemoryProductStore, NewProduct, PipelineControl, ProductStore, StoreFault,
};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

// --- Context for engine tests ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

pub type TestFuture = Pin<Box<dyn Future<Output = Result<PipelineControl, CatalogError>> + Send>>;

pub fn simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, "executed, counter: {}", guard.counter);
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  }
}

pub fn failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> impl Fn(ContextData<TestContext>) -> TestFuture + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> TestFuture {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(CatalogError::Validation(error_message.to_string()))
    })
  }
}

// --- Tracing ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Fixtures ---
pub fn air_max_draft() -> NewProduct {
  NewProduct {
    name: "Air Max 270".to_string(),
    brand: "Nike".to_string(),
    category: "Running".to_string(),
    price: Decimal::new(15000, 2),
    description: "Max Air heel unit for all-day comfort.".to_string(),
    features: vec!["Max Air unit".to_string(), "Mesh upper".to_string()],
    sizes: vec!["8".to_string(), "9".to_string()],
    colors: vec!["Black".to_string()],
    ..Default::default()
  }
}

pub fn jpeg_file(name: &str, width: u32, height: u32) -> IncomingFile {
  let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, image::Rgb([30, 90, 160])));
  let mut bytes = Vec::new();
  img
    .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg)
    .expect("encode test jpeg");
  IncomingFile::new(name, "image/jpeg", bytes)
}

pub fn transient_fault() -> StoreFault {
  StoreFault::new("Connection terminated unexpectedly")
}

pub fn permanent_fault() -> StoreFault {
  StoreFault::new("duplicate key value violates unique constraint").with_code("23505")
}

// --- Fault-injecting product store ---
/// Wraps [`MemoryProductStore`], counts calls per operation and fails queued calls.
#[derive(Default)]
pub struct FlakyStore {
  inner: MemoryProductStore,
  faults: Mutex<HashMap<&'static str, VecDeque<StoreFault>>>,
  calls: Mutex<HashMap<&'static str, usize>>,
}

impl FlakyStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn inner(&self) -> &MemoryProductStore {
    &self.inner
  }

  /// The next `times` calls of `operation` fail with a fault built by `make`.
  pub fn fail_next(&self, operation: &'static str, times: usize, make: fn() -> StoreFault) {
    let mut faults = self.faults.lock();
    let queue = faults.entry(operation).or_default();
    for _ in 0..times {
      queue.push_back(make());
    }
  }

  pub fn calls(&self, operation: &str) -> usize {
    self.calls.lock().get(operation).copied().unwrap_or(0)
  }

  fn enter(&self, operation: &'static str) -> Result<(), StoreFault> {
    *self.calls.lock().entry(operation).or_default() += 1;
    match self.faults.lock().get_mut(operation).and_then(VecDeque::pop_front) {
      Some(fault) => Err(fault),
      None => Ok(()),
    }
  }
}

#[async_trait]
impl ProductStore for FlakyStore {
  async fn insert_skeleton(&self, skeleton: &ProductSkeleton) -> Result<Uuid, StoreFault> {
    self.enter("insert_skeleton")?;
    self.inner.insert_skeleton(skeleton).await
  }

  async fn insert_product(&self, record: &ProductRecord) -> Result<Uuid, StoreFault> {
    self.enter("insert_product")?;
    self.inner.insert_product(record).await
  }

  async fn set_image(&self, id: Uuid, image: Option<&str>) -> Result<bool, StoreFault> {
    self.enter("set_image")?;
    self.inner.set_image(id, image).await
  }

  async fn set_arrays(&self, id: Uuid, arrays: &ProductArrays) -> Result<bool, StoreFault> {
    self.enter("set_arrays")?;
    self.inner.set_arrays(id, arrays).await
  }

  async fn update_scalars(&self, id: Uuid, fields: &ScalarFields) -> Result<bool, StoreFault> {
    self.enter("update_scalars")?;
    self.inner.update_scalars(id, fields).await
  }

  async fn find(&self, id: Uuid) -> Result<Option<Product>, StoreFault> {
    self.enter("find")?;
    self.inner.find(id).await
  }

  async fn list(&self) -> Result<Vec<Product>, StoreFault> {
    self.enter("list")?;
    self.inner.list().await
  }

  async fn delete(&self, id: Uuid) -> Result<bool, StoreFault> {
    self.enter("delete")?;
    self.inner.delete(id).await
  }
}

// --- Counting image store ---
/// Embeds bytes like [`EmbeddedImageStore`] and records every put and remove.
#[derive(Default)]
pub struct CountingImageStore {
  pub puts: AtomicUsize,
  pub removed: Mutex<Vec<String>>,
  pub fail_removes: bool,
}

impl CountingImageStore {
  pub fn failing_removes() -> Self {
    Self {
      fail_removes: true,
      ..Default::default()
    }
  }

  pub fn put_count(&self) -> usize {
    self.puts.load(Ordering::SeqCst)
  }

  pub fn removed(&self) -> Vec<String> {
    self.removed.lock().clone()
  }
}

#[async_trait]
impl ImageStore for CountingImageStore {
  async fn put(&self, bytes: Vec<u8>, content_type: &str, file_name: &str) -> anyhow::Result<String> {
    self.puts.fetch_add(1, Ordering::SeqCst);
    EmbeddedImageStore.put(bytes, content_type, file_name).await
  }

  async fn remove(&self, reference: &str) -> anyhow::Result<()> {
    self.removed.lock().push(reference.to_string());
    if self.fail_removes {
      anyhow::bail!("object store unavailable");
    }
    Ok(())
  }
}

pub fn intake_with(store: Arc<CountingImageStore>) -> ImageIntake {
  ImageIntake::new(store, IntakeConfig::default())
}
