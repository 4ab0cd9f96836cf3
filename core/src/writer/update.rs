// shoebox/src/writer/update.rs

//! Update pipeline: merges `ProductChanges` over the stored record, ingests any
//! new uploads, writes scalars then arrays. The main image an upload replaced is
//! released as soon as the scalar write has committed the new reference, so a
//! later failure cannot leave the old object orphaned.

use std::sync::Arc;
use tracing::{event, Level};

use crate::catalog::model::{clean_reference, Product, ProductArrays, ScalarFields};
use crate::catalog::store::ProductStore;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::CatalogError;
use crate::intake::ImageIntake;
use crate::pipeline::Pipeline;
use crate::writer::contexts::UpdateCtxData;
use crate::writer::{release_best_effort, WriterConfig};

pub(crate) fn build(
  store: Arc<dyn ProductStore>,
  intake: ImageIntake,
  config: &WriterConfig,
) -> Pipeline<UpdateCtxData> {
  let mut pipeline = Pipeline::<UpdateCtxData>::new(&[
    ("load_current", false, None),
    (
      "replace_main_image",
      true,
      Some(Arc::new(|ctx: ContextData<UpdateCtxData>| ctx.read().uploads.main.is_none())),
    ),
    (
      "append_additional_images",
      true,
      Some(Arc::new(|ctx: ContextData<UpdateCtxData>| {
        ctx.read().uploads.additional.is_empty()
      })),
    ),
    ("write_scalars", false, None),
    (
      "release_superseded",
      true,
      Some(Arc::new(|ctx: ContextData<UpdateCtxData>| {
        ctx.read().superseded_image.is_none()
      })),
    ),
    ("write_arrays", false, None),
    ("read_back", false, None),
  ]);

  let s = store.clone();
  pipeline.on("load_current", move |ctx: ContextData<UpdateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let id = ctx.read().id;
      let current = store.find(id).await?.ok_or(CatalogError::NotFound { id })?;

      let mut guard = ctx.write();
      let data = &mut *guard;
      data.image = match &data.changes.image {
        Some(explicit) => clean_reference(Some(explicit.clone())),
        None => current.image.clone(),
      };
      data.images = data.changes.images.clone().unwrap_or_else(|| current.images.clone());
      data.current = Some(current);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let i = intake.clone();
  pipeline.on("replace_main_image", move |ctx: ContextData<UpdateCtxData>| {
    let intake = i.clone();
    Box::pin(async move {
      let upload = ctx.write().uploads.main.take();
      let Some(file) = upload else {
        return Ok(PipelineControl::Continue);
      };
      let reference = intake.ingest(file).await?;

      let mut guard = ctx.write();
      let previous = guard.current.as_ref().and_then(|p| p.image.clone());
      if let Some(previous) = previous.filter(|p| *p != reference) {
        event!(Level::DEBUG, "Previous main image scheduled for release.");
        guard.superseded_image = Some(previous);
      }
      guard.image = Some(reference);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let i = intake.clone();
  pipeline.on("append_additional_images", move |ctx: ContextData<UpdateCtxData>| {
    let intake = i.clone();
    Box::pin(async move {
      let files = std::mem::take(&mut ctx.write().uploads.additional);
      for file in files {
        let reference = intake.ingest(file).await?;
        ctx.write().images.push(reference);
      }
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let s = store.clone();
  pipeline.on("write_scalars", move |ctx: ContextData<UpdateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let (id, fields) = {
        let guard = ctx.read();
        (guard.id, merged_scalars(loaded(&guard.current)?, &guard))
      };
      if !store.update_scalars(id, &fields).await? {
        return Err(CatalogError::NotFound { id });
      }
      Ok(PipelineControl::Continue)
    })
  });

  pipeline.on("release_superseded", move |ctx: ContextData<UpdateCtxData>| {
    let intake = intake.clone();
    Box::pin(async move {
      let superseded = ctx.write().superseded_image.take();
      if let Some(reference) = superseded {
        release_best_effort(&intake, &reference).await;
      }
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  let s = store.clone();
  pipeline.on("write_arrays", move |ctx: ContextData<UpdateCtxData>| {
    let store = s.clone();
    Box::pin(async move {
      let (id, arrays) = {
        let guard = ctx.read();
        (guard.id, merged_arrays(loaded(&guard.current)?, &guard))
      };
      if !store.set_arrays(id, &arrays).await? {
        return Err(CatalogError::NotFound { id });
      }
      Ok(PipelineControl::Continue)
    })
  });

  pipeline.on("read_back", move |ctx: ContextData<UpdateCtxData>| {
    let store = store.clone();
    Box::pin(async move {
      let id = ctx.read().id;
      let product = store.find(id).await?.ok_or(CatalogError::NotFound { id })?;
      ctx.write().product = Some(product);
      Ok::<_, CatalogError>(PipelineControl::Continue)
    })
  });

  for step in ["load_current", "write_scalars", "write_arrays", "read_back"] {
    pipeline.set_retry(step, config.retry);
  }

  pipeline
}

fn loaded(current: &Option<Product>) -> Result<&Product, CatalogError> {
  current
    .as_ref()
    .ok_or_else(|| CatalogError::Internal("current product was not loaded".to_string()))
}

fn merged_scalars(current: &Product, data: &UpdateCtxData) -> ScalarFields {
  let changes = &data.changes;
  ScalarFields {
    name: changes.name.clone().unwrap_or_else(|| current.name.clone()),
    brand: changes.brand.clone().unwrap_or_else(|| current.brand.clone()),
    category: changes.category.clone().unwrap_or_else(|| current.category.clone()),
    price: changes.price.unwrap_or(current.price),
    description: changes
      .description
      .clone()
      .unwrap_or_else(|| current.description.clone()),
    image: data.image.clone(),
    rating: changes.rating.unwrap_or(current.rating),
    review_count: changes.review_count.unwrap_or(current.review_count),
    in_stock: changes.in_stock.unwrap_or(current.in_stock),
    is_new: changes.is_new.unwrap_or(current.is_new),
  }
}

fn merged_arrays(current: &Product, data: &UpdateCtxData) -> ProductArrays {
  let changes = &data.changes;
  ProductArrays {
    features: changes.features.clone().unwrap_or_else(|| current.features.clone()),
    images: data.images.clone(),
    sizes: changes.sizes.clone().unwrap_or_else(|| current.sizes.clone()),
    colors: changes.colors.clone().unwrap_or_else(|| current.colors.clone()),
  }
}
