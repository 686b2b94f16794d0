// app/src/web/handlers/settings_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::{EmailTemplates, StoreInfo};
use crate::state::AppState;
use crate::store::{self, EMAIL_TEMPLATES_ID, SETTINGS, STORE_INFO_ID};
use crate::templates::PLACEHOLDERS;
use crate::web::extractors::AuthenticatedAdmin;

#[instrument(name = "handler::get_email_templates", skip_all)]
pub async fn get_email_templates_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
  let templates = store::get_typed::<EmailTemplates>(app_state.store.as_ref(), SETTINGS, EMAIL_TEMPLATES_ID)
    .await?
    .map(|stored| stored.data)
    .unwrap_or_default();
  Ok(HttpResponse::Ok().json(templates))
}

/// Merge-saves: fields left out of the payload keep their stored values.
#[instrument(name = "handler::save_email_templates", skip_all)]
pub async fn save_email_templates_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  payload: web::Json<EmailTemplates>,
) -> Result<HttpResponse, AppError> {
  let templates = payload.into_inner();
  app_state
    .store
    .set(SETTINGS, EMAIL_TEMPLATES_ID, store::to_document(&templates)?, true)
    .await?;
  info!("Email templates saved.");
  Ok(HttpResponse::Ok().json(json!({ "saved": true })))
}

#[instrument(name = "handler::get_store_info", skip_all)]
pub async fn get_store_info_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
) -> Result<HttpResponse, AppError> {
  let info = store::get_typed::<StoreInfo>(app_state.store.as_ref(), SETTINGS, STORE_INFO_ID)
    .await?
    .map(|stored| stored.data)
    .unwrap_or_default();
  Ok(HttpResponse::Ok().json(json!({
    "deliveryAreaText": info.delivery_area_text(),
  })))
}

#[instrument(name = "handler::save_store_info", skip_all)]
pub async fn save_store_info_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  payload: web::Json<StoreInfo>,
) -> Result<HttpResponse, AppError> {
  app_state
    .store
    .set(SETTINGS, STORE_INFO_ID, store::to_document(&payload.into_inner())?, true)
    .await?;
  info!("Store info saved.");
  Ok(HttpResponse::Ok().json(json!({ "saved": true })))
}

pub async fn placeholders_handler(_admin: AuthenticatedAdmin) -> HttpResponse {
  let placeholders: Vec<_> = PLACEHOLDERS
    .iter()
    .map(|(key, desc)| json!({ "key": key, "desc": desc }))
    .collect();
  HttpResponse::Ok().json(json!({ "placeholders": placeholders }))
}
