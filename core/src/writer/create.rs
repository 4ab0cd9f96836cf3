// shoebox/src/writer/create.rs

//! Create pipeline. `Atomic` writes the whole record in one statement;
//! `Staged` writes it across several, leaving a window where readers can see
//! a product without its image or arrays.

use std::sync::Arc;
use tracing::{event, Level};

use crate::catalog::store::ProductStore;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::CatalogError;
use crate::intake::ImageIntake;
use crate::pipeline::Pipeline;
use crate::writer::contexts::CreateCtxData;
use crate::writer::{assigned_id, ingest_all, CreateMode, WriterConfig};

pub(crate) fn build(
  store: Arc<dyn ProductStore>,
  intake: ImageIntake,
  config: &WriterConfig,
) -> Pipeline<CreateCtxData> {
  let mut pipeline = match config.create_mode {
    CreateMode::Atomic => Pipeline::<CreateCtxData>::new(&[
      ("ingest_uploads", true, Some(Arc::new(no_uploads))),
      ("insert_product", false, None),
      ("read_back", false, None),
    ]),
    CreateMode::Staged => Pipeline::<CreateCtxData>::new(&[
      ("ingest_uploads", true, Some(Arc::new(no_uploads))),
      ("insert_skeleton", false, None),
      ("attach_image", false, Some(Arc::new(no_main_image))),
      ("attach_arrays", false, None),
      ("read_back", false, None),
    ]),
  };

  pipeline.on("ingest_uploads", move |ctx: ContextData<CreateCtxData>| {
    let intake = intake.clone();
    Box::pin(async move {
      let uploads = std::mem::take(&mut ctx.write().uploads);
      let (image, images) = ingest_all(&intake, uploads).await?;
      let mut guard = ctx.write();
      if image.is_some() {
        guard.draft.image = image;
      }
      guard.draft.images.extend(images);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  match config.create_mode {
    CreateMode::Atomic => register_atomic(&mut pipeline, store.clone()),
    CreateMode::Staged => register_staged(&mut pipeline, store.clone()),
  }

  let s = store;
  pipeline.on("read_back", move |ctx: ContextData<CreateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let id = assigned_id(ctx.read().product_id)?;
      let product = store.find(id).await?.ok_or(CatalogError::NotFound { id })?;
      ctx.write().product = Some(product);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let storage_steps: &[&str] = match config.create_mode {
    CreateMode::Atomic => &["insert_product", "read_back"],
    CreateMode::Staged => &["insert_skeleton", "attach_image", "attach_arrays", "read_back"],
  };
  for step in storage_steps {
    pipeline.set_retry(step, config.retry);
  }

  pipeline
}

fn no_uploads(ctx: ContextData<CreateCtxData>) -> bool {
  ctx.read().uploads.is_empty()
}

fn no_main_image(ctx: ContextData<CreateCtxData>) -> bool {
  ctx.read().draft.image.as_deref().map_or(true, |r| r.trim().is_empty())
}

fn register_atomic(pipeline: &mut Pipeline<CreateCtxData>, store: Arc<dyn ProductStore>) {
  pipeline.on("insert_product", move |ctx: ContextData<CreateCtxData>| {
    let store = store.clone();
    Box::pin(async move {
      let record = ctx.read().draft.record();
      let id = store.insert_product(&record).await?;
      event!(Level::INFO, product_id = %id, "Product row inserted.");
      ctx.write().product_id = Some(id);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });
}

fn register_staged(pipeline: &mut Pipeline<CreateCtxData>, store: Arc<dyn ProductStore>) {
  let s = store.clone();
  pipeline.on("insert_skeleton", move |ctx: ContextData<CreateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let skeleton = ctx.read().draft.skeleton();
      let id = store.insert_skeleton(&skeleton).await?;
      event!(Level::INFO, product_id = %id, "Product skeleton inserted.");
      ctx.write().product_id = Some(id);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let s = store.clone();
  pipeline.on("attach_image", move |ctx: ContextData<CreateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let (id, image) = {
        let guard = ctx.read();
        (assigned_id(guard.product_id)?, guard.draft.record().image)
      };
      if !store.set_image(id, image.as_deref()).await? {
        return Err(CatalogError::NotFound { id });
      }
      Ok(PipelineControl::Continue)
    })
  });

  pipeline.on("attach_arrays", move |ctx: ContextData<CreateCtxData>| {
    let store = store.clone();
    Box::pin(async move {
      let (id, arrays) = {
        let guard = ctx.read();
        (assigned_id(guard.product_id)?, guard.draft.arrays())
      };
      if !store.set_arrays(id, &arrays).await? {
        return Err(CatalogError::NotFound { id });
      }
      Ok(PipelineControl::Continue)
    })
  });
}
