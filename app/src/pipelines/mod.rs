// app/src/pipelines/mod.rs

//! Every multi-step flow of the service, expressed as a `bento_flow` pipeline
//! and registered once at startup.

use crate::errors::AppError;
use crate::state::AppState;
use bento_flow::Registry;

pub mod completion_email;
pub mod contexts;
pub mod nightly_export;
pub mod order_created;
pub mod public_data;
pub mod submit_order;

pub fn register_all_pipelines(registry: &Registry<AppError>, app_state: &AppState) {
  tracing::info!("Registering pipelines...");

  submit_order::register_submit_order_pipeline(registry, app_state);
  order_created::register_order_created_pipeline(registry, app_state);
  completion_email::register_completion_email_pipeline(registry, app_state);
  public_data::register_public_data_pipeline(registry, app_state);
  nightly_export::register_nightly_export_pipeline(registry, app_state);

  tracing::info!("All pipelines registered.");
}
