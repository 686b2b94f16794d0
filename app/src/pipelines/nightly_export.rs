// app/src/pipelines/nightly_export.rs

//! The daily full-database export.

use crate::errors::{AppError, Result};
use crate::pipelines::contexts::NightlyExportCtxData;
use crate::services::{backup_prefix, ExportReport};
use crate::state::AppState;
use bento_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use chrono::{DateTime, Utc};
use tracing::{error, info, instrument};

pub fn register_nightly_export_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<NightlyExportCtxData, AppError>::new(&[
    ("compute_prefix", false, None),
    ("export_documents", false, None),
  ]);

  p.on("compute_prefix", |ctx: ContextData<NightlyExportCtxData>| async move {
    let mut guard = ctx.write();
    let started_at = guard.started_at;
    guard.prefix = backup_prefix(started_at);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("export_documents", |ctx: ContextData<NightlyExportCtxData>| async move {
    let (app_state, prefix) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.prefix.clone())
    };
    let report = app_state.exporter.export_documents(&prefix).await.map_err(|e| {
      error!(%prefix, error = %e, "Database export failed.");
      AppError::from(e)
    })?;
    info!(
      location = %report.location.display(),
      collections = report.collections.len(),
      documents = report.documents,
      "Database export finished."
    );
    ctx.write().report = Some(report);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}

/// One export run, stamped with `started_at`.
#[instrument(name = "pipelines::nightly_export", skip(app_state), err(Display))]
pub async fn run_nightly_export(app_state: &AppState, started_at: DateTime<Utc>) -> Result<ExportReport> {
  let ctx = ContextData::new(NightlyExportCtxData {
    app_state: app_state.clone(),
    started_at,
    prefix: String::new(),
    report: None,
  });
  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => ctx
      .write()
      .report
      .take()
      .ok_or_else(|| AppError::Internal("Export finished without a report.".to_string())),
    PipelineResult::Stopped => Err(AppError::Internal("Export run was halted.".to_string())),
  }
}
