// app/src/web/handlers/callable_handlers.rs

//! Callable functions used by the storefront and the dashboard.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::OrderSubmission;
use crate::pipelines::completion_email::send_completion_email;
use crate::pipelines::contexts::SubmissionOrigin;
use crate::pipelines::public_data::get_public_data;
use crate::pipelines::submit_order::submit_order;
use crate::state::AppState;
use crate::web::callable::{callable_ok, parse_callable};
use crate::web::extractors::{AttestedApp, AuthenticatedAdmin};

#[instrument(name = "handler::get_public_data", skip_all)]
pub async fn get_public_data_handler(
  app_state: web::Data<AppState>,
  _attested: AttestedApp,
) -> Result<HttpResponse, AppError> {
  let payload = get_public_data(app_state.get_ref()).await?;
  info!(products = payload.products.len(), "Public data served.");
  Ok(callable_ok(payload))
}

#[instrument(name = "handler::submit_order", skip_all)]
pub async fn submit_order_handler(
  app_state: web::Data<AppState>,
  _attested: AttestedApp,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let submission: OrderSubmission = parse_callable(&body)?
    .ok_or_else(|| AppError::InvalidArgument("The order payload is missing.".to_string()))?;

  let outcome = submit_order(app_state.get_ref(), submission, SubmissionOrigin::Storefront).await?;
  info!(order_id = %outcome.response.order_id, total_price = outcome.response.total_price, "Order accepted.");
  Ok(callable_ok(outcome.response))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CompletionEmailRequest {
  #[serde(default)]
  order_id: Option<String>,
}

#[instrument(name = "handler::send_completion_email", skip_all)]
pub async fn send_completion_email_handler(
  app_state: web::Data<AppState>,
  admin: Option<AuthenticatedAdmin>,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  // Authentication is checked first by the pipeline, so parse leniently here.
  let request: Option<CompletionEmailRequest> = if admin.is_some() { parse_callable(&body)? } else { None };
  let order_id = request.and_then(|r| r.order_id);

  let response = send_completion_email(app_state.get_ref(), admin.is_some(), order_id).await?;
  Ok(callable_ok(response))
}
