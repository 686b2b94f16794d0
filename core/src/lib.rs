// core/src/lib.rs

//! bento-flow: the step-pipeline engine behind the bento order service.
//!
//! A pipeline is an ordered list of named steps. Each step may carry
//! `before`, `on` and `after` handlers that run against a shared
//! [`ContextData`]. Handlers return [`PipelineControl::Continue`] to move on
//! or [`PipelineControl::Stop`] to end the run early. Steps can be marked
//! optional (allowed to have no handlers) or skipped with a condition.
//!
//! A [`Registry`] holds one pipeline per context type so that callers can
//! run a flow just by handing over its context:
//!
//! ```ignore
//! let registry = Registry::<AppError>::new();
//! registry.register_pipeline(order_created_pipeline());
//! registry.run(ContextData::new(OrderCreatedCtx::new(order_id))).await?;
//! ```

pub mod context;
pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod step;

pub use crate::context::{ContextData, Handler, HandlerFuture};
pub use crate::control::{PipelineControl, PipelineResult};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Registry;
pub use crate::step::{SkipCondition, StepDef};
