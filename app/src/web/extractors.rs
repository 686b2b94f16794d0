// app/src/web/extractors.rs

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

pub const APP_CHECK_HEADER: &str = "X-Firebase-AppCheck";

fn app_state(req: &HttpRequest) -> Result<&web::Data<AppState>, AppError> {
  req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))
}

/// Present only when the request carries an accepted app-attestation token.
#[derive(Debug, Clone, Copy)]
pub struct AttestedApp;

impl FromRequest for AttestedApp {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = app_state(req).and_then(|state| {
      let token = req.headers().get(APP_CHECK_HEADER).and_then(|v| v.to_str().ok());
      if state.attestation.verify(token) {
        Ok(AttestedApp)
      } else {
        warn!(path = %req.path(), "Request rejected: missing or unknown app-check token.");
        Err(AppError::FailedPrecondition(
          "The function must be called from an App Check verified app.".to_string(),
        ))
      }
    });
    ready(result)
  }
}

/// Dashboard staff, identified by the admin bearer token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedAdmin;

impl FromRequest for AuthenticatedAdmin {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(authenticate_admin(req))
  }
}

fn authenticate_admin(req: &HttpRequest) -> Result<AuthenticatedAdmin, AppError> {
  let state = app_state(req)?;
  let stored_hash = state
    .config
    .admin_token_hash
    .as_deref()
    .ok_or_else(|| AppError::Unauthenticated("Admin access is not configured.".to_string()))?;

  let provided = req
    .headers()
    .get(actix_web::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .ok_or_else(|| AppError::Unauthenticated("Missing bearer token.".to_string()))?;

  if auth_service::verify_admin_token(stored_hash, provided)? {
    Ok(AuthenticatedAdmin)
  } else {
    warn!(path = %req.path(), "Admin token rejected.");
    Err(AppError::Unauthenticated("Invalid admin token.".to_string()))
  }
}
