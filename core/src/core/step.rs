// shoebox/src/core/step.rs

//! Definition of a single step within a pipeline.

use super::ContextData;
use crate::retry::RetryPolicy;

/// Evaluated before a step runs; when it returns true the step is skipped.
pub type SkipCondition<TData> = std::sync::Arc<dyn Fn(ContextData<TData>) -> bool + Send + Sync + 'static>;

#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
  /// When set, each handler of the step runs under the retry executor.
  pub retry: Option<RetryPolicy>,
}

// SkipCondition is an Arc<dyn Fn> and has no Debug of its own.
impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .field("retry", &self.retry)
      .finish()
  }
}
