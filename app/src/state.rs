// app/src/state.rs

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::services::{AttestationVerifier, DatabaseExporter, Mailer};
use crate::store::DocumentStore;
use bento_flow::Registry;
use std::sync::Arc;

/// Process-wide collaborators, built once at startup and cloned into every
/// request and pipeline context.
#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn DocumentStore>,
  pub mailer: Arc<dyn Mailer>,
  pub exporter: Arc<dyn DatabaseExporter>,
  pub attestation: Arc<AttestationVerifier>,
  pub flows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the state with every pipeline registered.
  pub fn new(
    config: AppConfig,
    store: Arc<dyn DocumentStore>,
    mailer: Arc<dyn Mailer>,
    exporter: Arc<dyn DatabaseExporter>,
  ) -> Self {
    let state = Self {
      attestation: Arc::new(AttestationVerifier::new(config.app_check_tokens.iter().cloned())),
      store,
      mailer,
      exporter,
      flows: Arc::new(Registry::new()),
      config: Arc::new(config),
    };
    crate::pipelines::register_all_pipelines(&state.flows, &state);
    state
  }
}
