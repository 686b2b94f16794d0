// core/src/pipeline.rs

//! `Pipeline<TData, Err>`: step definitions, hook registration and execution.

use crate::context::{ContextData, Handler};
use crate::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::step::{SkipCondition, StepDef};
use std::collections::HashMap;
use std::future::Future;
use tracing::{event, instrument, span, Instrument, Level};

#[derive(Debug, Clone, Copy)]
enum Phase {
  Before,
  On,
  After,
}

impl Phase {
  fn label(self) -> &'static str {
    match self {
      Phase::Before => "before",
      Phase::On => "on",
      Phase::After => "after",
    }
  }
}

/// An ordered set of named steps over the context type `TData`.
///
/// `Err` is whatever the handlers return. It must be constructible from
/// [`FlowError`] so that engine failures (a required step without handlers)
/// come back through the same channel.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  steps: Vec<StepDef<TData>>,
  before: HashMap<String, Vec<Handler<TData, Err>>>,
  on: HashMap<String, Vec<Handler<TData, Err>>>,
  after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Builds a pipeline from `(name, optional, skip_if)` triples, in run order.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  // Registering a hook on an unknown step is a wiring bug, not a runtime condition.
  fn ensure_step_exists(&self, step_name: &str) {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!("bento-flow setup error: step '{}' is not defined in this pipeline", step_name);
    }
  }

  fn wrap<F, E>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx_data| {
      let fut = handler_fn(ctx_data);
      Box::pin(async move { fut.await.map_err(Into::into) })
    })
  }

  pub fn before<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.before.entry(step_name.to_string()).or_default().push(Self::wrap(handler_fn));
  }

  pub fn on<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.on.entry(step_name.to_string()).or_default().push(Self::wrap(handler_fn));
  }

  pub fn after<F, E>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self.after.entry(step_name.to_string()).or_default().push(Self::wrap(handler_fn));
  }

  /// Registers an already boxed handler, e.g. one shared between pipelines.
  pub fn on_boxed(&mut self, step_name: &str, handler: Handler<TData, Err>) {
    self.ensure_step_exists(step_name);
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  fn handlers_for(&self, phase: Phase, step_name: &str) -> &[Handler<TData, Err>] {
    let map = match phase {
      Phase::Before => &self.before,
      Phase::On => &self.on,
      Phase::After => &self.after,
    };
    map.get(step_name).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Runs one phase of a step. `Some(Stopped)` means a handler asked to stop.
  async fn run_phase(
    &self,
    phase: Phase,
    step_name: &str,
    ctx_data: &ContextData<TData>,
  ) -> Result<Option<PipelineResult>, Err> {
    for (handler_idx, handler_fn) in self.handlers_for(phase, step_name).iter().enumerate() {
      let handler_span = span!(Level::DEBUG, "handler", phase = phase.label(), handler_index = handler_idx);
      match handler_fn(ctx_data.clone()).instrument(handler_span).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, step = step_name, phase = phase.label(), "Pipeline stopped by handler.");
          return Ok(Some(PipelineResult::Stopped));
        }
        Err(e) => {
          event!(Level::ERROR, step = step_name, phase = phase.label(), error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(None)
  }

  /// Executes every step in order against `ctx_data`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(context_type = %std::any::type_name::<TData>(), num_steps = self.steps.len()),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(Level::INFO, "step", step_name, step_index = step_idx);

      let outcome = async {
        if let Some(skip_if) = &step_def.skip_if {
          if skip_if(ctx_data.clone()) {
            event!(Level::DEBUG, "Step skipped by condition.");
            return Ok(None);
          }
        }

        let has_handlers = [Phase::Before, Phase::On, Phase::After]
          .iter()
          .any(|phase| !self.handlers_for(*phase, step_name).is_empty());
        if !has_handlers {
          if step_def.optional {
            event!(Level::DEBUG, "Optional step has no handlers, skipping.");
            return Ok(None);
          }
          return Err(Err::from(FlowError::HandlerMissing {
            step_name: step_def.name.clone(),
          }));
        }

        for phase in [Phase::Before, Phase::On, Phase::After] {
          if let Some(stopped) = self.run_phase(phase, step_name, &ctx_data).await? {
            return Ok(Some(stopped));
          }
        }
        Ok::<Option<PipelineResult>, Err>(None)
      }
      .instrument(step_span)
      .await?;

      if let Some(result) = outcome {
        return Ok(result);
      }
    }

    event!(Level::DEBUG, "Pipeline completed.");
    Ok(PipelineResult::Completed)
  }
}
