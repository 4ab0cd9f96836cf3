// shoebox/src/pipeline/definition.rs

//! The `Pipeline<TData>` struct and the methods that shape its steps.

use crate::core::context::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::retry::RetryPolicy;
use std::collections::HashMap;

/// An ordered list of named steps run against a shared `ContextData<TData>`.
pub struct Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData>>>,
}

impl<TData> Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  /// Creates a pipeline from `(name, optional, skip_if)` step declarations.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_cond_opt)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_cond_opt.clone(),
        retry: None,
      })
      .collect();

    Self {
      steps,
      on: HashMap::new(),
    }
  }

  /// Panics if the step is not declared. A typo in a step name is a setup bug,
  /// not a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("Pipeline setup error: Step '{}' not found in pipeline definition.", step_name);
    }
  }

  fn step_mut(&mut self, step_name: &str) -> &mut StepDef<TData> {
    self.ensure_step_exists(step_name);
    match self.steps.iter_mut().find(|s| s.name == step_name) {
      Some(step) => step,
      None => unreachable!("step existence checked above"),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    self.step_mut(step_name).optional = optional;
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    self.step_mut(step_name).skip_if = skip_if;
  }

  /// Runs every handler of `step_name` under `policy`.
  pub fn set_retry(&mut self, step_name: &str, policy: RetryPolicy) {
    self.step_mut(step_name).retry = Some(policy);
  }
}
