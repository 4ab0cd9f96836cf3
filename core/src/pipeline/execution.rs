// shoebox/src/pipeline/execution.rs

//! `Pipeline::run()`: sequential execution of steps and their handlers.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::step::StepDef;
use crate::error::CatalogError;
use crate::pipeline::definition::Pipeline;
use crate::retry::run_with_retry;
use tracing::{event, instrument, Instrument, Level};

impl<TData> Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Steps run one after another; each handler is awaited before the next one
  /// starts. The first handler error ends the run and is returned as is. Work
  /// committed by earlier steps is not undone.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      pipeline_context_data_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, CatalogError> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_span = tracing::info_span!(
        "pipeline_step_execution",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      match self.run_step(step_def, &ctx_data).instrument(step_span).await? {
        PipelineControl::Continue => {}
        PipelineControl::Stop => return Ok(PipelineResult::Stopped),
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed successfully.");
    Ok(PipelineResult::Completed)
  }

  async fn run_step(&self, step_def: &StepDef<TData>, ctx_data: &ContextData<TData>) -> Result<PipelineControl, CatalogError> {
    event!(Level::DEBUG, "Processing step.");

    if let Some(skip_cond_fn) = &step_def.skip_if {
      if skip_cond_fn(ctx_data.clone()) {
        event!(Level::INFO, "Step skipped due to 'skip_if' condition.");
        return Ok(PipelineControl::Continue);
      }
    }

    let handlers = match self.on.get(step_def.name.as_str()) {
      Some(handlers) if !handlers.is_empty() => handlers,
      _ if step_def.optional => {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(PipelineControl::Continue);
      }
      _ => {
        event!(Level::ERROR, "Non-optional step has no handlers.");
        return Err(CatalogError::HandlerMissing {
          step_name: step_def.name.clone(),
        });
      }
    };

    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      let outcome = self
        .invoke(step_def, handler_fn, ctx_data)
        .instrument(tracing::debug_span!("on_handler", handler_index = handler_idx))
        .await;
      match outcome {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, "Pipeline stopped by a handler.");
          return Ok(PipelineControl::Stop);
        }
        Err(e) => {
          event!(Level::ERROR, error = %e, kind = %e.kind(), "Step handler failed.");
          return Err(e);
        }
      }
    }

    event!(Level::DEBUG, "Step processing finished successfully.");
    Ok(PipelineControl::Continue)
  }

  async fn invoke(
    &self,
    step_def: &StepDef<TData>,
    handler_fn: &Handler<TData>,
    ctx_data: &ContextData<TData>,
  ) -> Result<PipelineControl, CatalogError> {
    match &step_def.retry {
      Some(policy) => run_with_retry(policy, &step_def.name, || handler_fn(ctx_data.clone())).await,
      None => handler_fn(ctx_data.clone()).await,
    }
  }
}
