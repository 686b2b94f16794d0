// app/src/pipelines/completion_email.rs

//! `sendCompletionEmail`: one "preparation complete" email per order.

use crate::errors::{AppError, Result};
use crate::lifecycle;
use crate::models::Order;
use crate::pipelines::contexts::CompletionEmailCtxData;
use crate::pipelines::order_created::load_email_templates;
use crate::services::OutgoingEmail;
use crate::state::AppState;
use crate::store::{self, ORDERS};
use crate::templates::{self, EmailKind, TemplateVars};
use bento_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use serde::Serialize;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionEmailResponse {
  pub success: bool,
  pub message: String,
}

pub fn register_completion_email_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<CompletionEmailCtxData, AppError>::new(&[
    ("authorize", false, None),
    ("validate_request", false, None),
    ("load_order", false, None),
    ("check_lifecycle", false, None),
    ("load_email_settings", false, None),
    ("send_completion_email", false, None),
    ("latch_completion_flag", false, None),
  ]);

  p.on("authorize", |ctx: ContextData<CompletionEmailCtxData>| async move {
    if !ctx.read().caller_authenticated {
      return Err(AppError::Unauthenticated(
        "The function must be called while authenticated.".to_string(),
      ));
    }
    Ok(PipelineControl::Continue)
  });

  p.on("validate_request", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let order_id = ctx
      .read()
      .requested_order_id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(str::to_string);
    match order_id {
      Some(order_id) => {
        ctx.write().order_id = order_id;
        Ok(PipelineControl::Continue)
      }
      None => Err(AppError::InvalidArgument(
        "The function must be called with an \"orderId\" argument.".to_string(),
      )),
    }
  });

  p.on("load_order", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let (app_state, order_id) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.order_id.clone())
    };
    let order = store::get_typed::<Order>(app_state.store.as_ref(), ORDERS, &order_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order {} was not found.", order_id)))?;
    ctx.write().order = Some(order.data);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("check_lifecycle", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let guard = ctx.read();
    let order = guard
      .order
      .as_ref()
      .ok_or_else(|| AppError::Internal("Order not loaded.".to_string()))?;
    lifecycle::ensure_completion_allowed(order)?;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("load_email_settings", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let app_state = ctx.read().app_state.clone();
    let templates = load_email_templates(&app_state).await?;
    if templates.sender().is_none() {
      return Err(AppError::FailedPrecondition(
        "The sender email address is not configured.".to_string(),
      ));
    }
    ctx.write().templates = templates;
    Ok(PipelineControl::Continue)
  });

  p.on("send_completion_email", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let (app_state, email) = {
      let guard = ctx.read();
      let order = guard
        .order
        .as_ref()
        .ok_or_else(|| AppError::Internal("Order not loaded.".to_string()))?;
      let config = &guard.app_state.config;
      let vars = TemplateVars::for_order(order, &config.dashboard_order_url(&guard.order_id), config.store_offset);
      let (subject, text) = templates::compose(EmailKind::ProcessComplete, &guard.templates, &vars);
      let email = OutgoingEmail {
        to: order.customer_email.clone(),
        from: guard.templates.sender().unwrap_or_default().to_string(),
        subject,
        text,
      };
      (guard.app_state.clone(), email)
    };

    let message_id = app_state.mailer.send(email).await.map_err(|e| {
      error!(error = %e, "Completion email could not be sent; flag left unset.");
      AppError::Internal("Failed to send the completion email.".to_string())
    })?;
    info!(message_id = %message_id.0, "Completion email sent.");
    ctx.write().message_id = Some(message_id);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("latch_completion_flag", |ctx: ContextData<CompletionEmailCtxData>| async move {
    let (app_state, order_id) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.order_id.clone())
    };
    lifecycle::latch_completion_email_sent(app_state.store.as_ref(), &order_id).await?;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}

#[instrument(name = "pipelines::completion_email", skip(app_state), err(Display))]
pub async fn send_completion_email(
  app_state: &AppState,
  caller_authenticated: bool,
  order_id: Option<String>,
) -> Result<CompletionEmailResponse> {
  let ctx = ContextData::new(CompletionEmailCtxData::new(app_state.clone(), caller_authenticated, order_id));
  match app_state.flows.run(ctx).await? {
    PipelineResult::Completed => Ok(CompletionEmailResponse {
      success: true,
      message: "Completion email sent successfully.".to_string(),
    }),
    PipelineResult::Stopped => Err(AppError::Internal("Completion email flow was halted.".to_string())),
  }
}
