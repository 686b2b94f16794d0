// app/src/pipelines/order_created.rs

//! Runs once per stored order: number it, then send the customer
//! confirmation and the admin notification.

use crate::errors::{AppError, Result};
use crate::models::{EmailTemplates, Order};
use crate::pipelines::contexts::OrderCreatedCtxData;
use crate::sequencer::{self, AssignOutcome};
use crate::services::OutgoingEmail;
use crate::state::AppState;
use crate::store::{self, EMAIL_TEMPLATES_ID, ORDERS, SETTINGS};
use crate::templates::{self, EmailKind, TemplateVars};
use bento_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use tracing::{error, info, instrument, warn};

/// What a run of the order-created pipeline did, for logs and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreatedSummary {
  pub assignment: Option<AssignOutcome>,
  pub customer_email_sent: bool,
  pub admin_email_sent: bool,
  pub completed: bool,
}

pub fn register_order_created_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<OrderCreatedCtxData, AppError>::new(&[
    ("load_order", false, None),
    ("assign_order_number", false, None),
    ("load_email_settings", false, None),
    ("send_customer_confirmation", true, None),
    ("send_admin_notification", true, None),
  ]);

  p.on("load_order", |ctx: ContextData<OrderCreatedCtxData>| async move {
    let (app_state, order_id) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.order_id.clone())
    };
    let order = store::get_typed::<Order>(app_state.store.as_ref(), ORDERS, &order_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Order {} does not exist.", order_id)))?;
    ctx.write().order = Some(order.data);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("assign_order_number", |ctx: ContextData<OrderCreatedCtxData>| async move {
    let (app_state, order_id) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.order_id.clone())
    };
    let outcome = sequencer::assign_order_number(
      app_state.store.as_ref(),
      &order_id,
      app_state.config.order_number_start,
    )
    .await?;

    let mut guard = ctx.write();
    guard.assignment = Some(outcome);
    match outcome {
      AssignOutcome::AlreadyAssigned(number) => {
        info!(order_number = number, "Redelivered order-created event; emails were sent by the first delivery.");
        Ok::<_, AppError>(PipelineControl::Stop)
      }
      AssignOutcome::Assigned(number) => {
        if let Some(order) = guard.order.as_mut() {
          order.order_number = Some(number);
        }
        Ok(PipelineControl::Continue)
      }
    }
  });

  p.on("load_email_settings", |ctx: ContextData<OrderCreatedCtxData>| async move {
    let app_state = ctx.read().app_state.clone();
    let templates = load_email_templates(&app_state).await?;

    if templates.sender().is_none() || templates.admin_recipient().is_none() {
      warn!("Sender or admin address is not configured; skipping order emails.");
      return Ok::<_, AppError>(PipelineControl::Stop);
    }
    ctx.write().templates = templates;
    Ok(PipelineControl::Continue)
  });

  p.on("send_customer_confirmation", |ctx: ContextData<OrderCreatedCtxData>| async move {
    let (app_state, email) = {
      let guard = ctx.read();
      let email = compose_for(&guard, EmailKind::OrderConfirmation, |order, _| order.customer_email.clone())?;
      (guard.app_state.clone(), email)
    };

    match app_state.mailer.send(email).await {
      Ok(message_id) => {
        info!(message_id = %message_id.0, "Order confirmation sent to customer.");
        ctx.write().customer_message = Some(message_id);
      }
      Err(e) => error!(error = %e, "Failed to send order confirmation to customer."),
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("send_admin_notification", |ctx: ContextData<OrderCreatedCtxData>| async move {
    let (app_state, email) = {
      let guard = ctx.read();
      let email = compose_for(&guard, EmailKind::AdminNotification, |_, templates| {
        templates.admin_recipient().unwrap_or_default().to_string()
      })?;
      (guard.app_state.clone(), email)
    };

    match app_state.mailer.send(email).await {
      Ok(message_id) => {
        info!(message_id = %message_id.0, "New order notification sent to admin.");
        ctx.write().admin_message = Some(message_id);
      }
      Err(e) => error!(error = %e, "Failed to send new order notification to admin."),
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}

fn compose_for(
  data: &OrderCreatedCtxData,
  kind: EmailKind,
  recipient: impl Fn(&Order, &EmailTemplates) -> String,
) -> Result<OutgoingEmail> {
  let order = data
    .order
    .as_ref()
    .ok_or_else(|| AppError::Internal("Order not loaded.".to_string()))?;
  let config = &data.app_state.config;
  let vars = TemplateVars::for_order(order, &config.dashboard_order_url(&data.order_id), config.store_offset);
  let (subject, text) = templates::compose(kind, &data.templates, &vars);
  Ok(OutgoingEmail {
    to: recipient(order, &data.templates),
    from: data.templates.sender().unwrap_or_default().to_string(),
    subject,
    text,
  })
}

/// Reads `settings/emailTemplates`; a missing document means every field is unset.
pub async fn load_email_templates(app_state: &AppState) -> Result<EmailTemplates> {
  Ok(
    store::get_typed::<EmailTemplates>(app_state.store.as_ref(), SETTINGS, EMAIL_TEMPLATES_ID)
      .await?
      .map(|stored| stored.data)
      .unwrap_or_default(),
  )
}

/// Runs the order-created pipeline for `order_id`.
#[instrument(name = "pipelines::order_created", skip(app_state), err(Display))]
pub async fn run_order_created(app_state: &AppState, order_id: &str) -> Result<OrderCreatedSummary> {
  let ctx = ContextData::new(OrderCreatedCtxData::new(app_state.clone(), order_id.to_string()));
  let result = app_state.flows.run(ctx.clone()).await?;

  let guard = ctx.read();
  Ok(OrderCreatedSummary {
    assignment: guard.assignment,
    customer_email_sent: guard.customer_message.is_some(),
    admin_email_sent: guard.admin_message.is_some(),
    completed: result == PipelineResult::Completed,
  })
}
