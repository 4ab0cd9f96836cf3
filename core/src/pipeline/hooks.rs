// shoebox/src/pipeline/hooks.rs

//! Registration of step handlers.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::CatalogError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;

impl<TData> Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  /// Registers a handler for a declared step. Handlers of one step run in
  /// registration order.
  ///
  /// The handler's error type only needs to convert into [`CatalogError`].
  pub fn on<F, UserProvidedErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, UserProvidedErr>> + Send + 'static,
    UserProvidedErr: Into<CatalogError> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let final_handler: Handler<TData> = Box::new(move |ctx_data| {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self.on.entry(step_name.to_string()).or_default().push(final_handler);
  }
}
