// app/src/errors.rs

use crate::services::exporter::ExportError;
use crate::services::mailer::MailError;
use crate::store::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use bento_flow::FlowError;
use serde_json::json;
use thiserror::Error;

/// Error codes of the callable protocol, as seen by storefront and dashboard clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
  Unauthenticated,
  InvalidArgument,
  NotFound,
  AlreadyExists,
  FailedPrecondition,
  Internal,
}

impl ErrorCode {
  pub fn as_str(self) -> &'static str {
    match self {
      ErrorCode::Unauthenticated => "unauthenticated",
      ErrorCode::InvalidArgument => "invalid-argument",
      ErrorCode::NotFound => "not-found",
      ErrorCode::AlreadyExists => "already-exists",
      ErrorCode::FailedPrecondition => "failed-precondition",
      ErrorCode::Internal => "internal",
    }
  }

  /// Upper-case form used in the `error.status` field of responses.
  pub fn status_name(self) -> &'static str {
    match self {
      ErrorCode::Unauthenticated => "UNAUTHENTICATED",
      ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
      ErrorCode::NotFound => "NOT_FOUND",
      ErrorCode::AlreadyExists => "ALREADY_EXISTS",
      ErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
      ErrorCode::Internal => "INTERNAL",
    }
  }

  pub fn http_status(self) -> StatusCode {
    match self {
      ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
      ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
      ErrorCode::NotFound => StatusCode::NOT_FOUND,
      ErrorCode::AlreadyExists => StatusCode::CONFLICT,
      ErrorCode::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
      ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Unauthenticated: {0}")]
  Unauthenticated(String),

  #[error("Invalid argument: {0}")]
  InvalidArgument(String),

  /// Order submission problems, all collected before anything is stored.
  #[error("Validation failed: {}", .0.join("; "))]
  Validation(Vec<String>),

  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Already exists: {0}")]
  AlreadyExists(String),

  #[error("Failed precondition: {0}")]
  FailedPrecondition(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Document store error: {0}")]
  Store(#[from] StoreError),

  #[error("Mail provider error: {0}")]
  Mail(#[from] MailError),

  #[error("Export error: {0}")]
  Export(#[from] ExportError),

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal error: {0}")]
  Internal(String),
}

impl AppError {
  pub fn code(&self) -> ErrorCode {
    match self {
      AppError::Unauthenticated(_) => ErrorCode::Unauthenticated,
      AppError::InvalidArgument(_) | AppError::Validation(_) => ErrorCode::InvalidArgument,
      AppError::NotFound(_) | AppError::Store(StoreError::NotFound { .. }) => ErrorCode::NotFound,
      AppError::AlreadyExists(_) => ErrorCode::AlreadyExists,
      AppError::FailedPrecondition(_) => ErrorCode::FailedPrecondition,
      AppError::Config(_)
      | AppError::Store(_)
      | AppError::Mail(_)
      | AppError::Export(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => ErrorCode::Internal,
    }
  }

  /// Message safe to hand to a client. Infrastructure details stay in the logs.
  pub fn client_message(&self) -> String {
    match self {
      AppError::Unauthenticated(m)
      | AppError::InvalidArgument(m)
      | AppError::NotFound(m)
      | AppError::AlreadyExists(m)
      | AppError::FailedPrecondition(m)
      | AppError::Internal(m) => m.clone(),
      AppError::Validation(messages) => messages.join("\n"),
      AppError::Store(StoreError::NotFound { collection, id }) => format!("{}/{} was not found.", collection, id),
      AppError::Config(_) | AppError::Store(_) | AppError::Mail(_) | AppError::Export(_) | AppError::Workflow { .. } => {
        "An internal error occurred.".to_string()
      }
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl From<serde_json::Error> for AppError {
  fn from(err: serde_json::Error) -> Self {
    AppError::InvalidArgument(format!("Malformed payload: {}", err))
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    self.code().http_status()
  }

  fn error_response(&self) -> HttpResponse {
    let code = self.code();
    if code == ErrorCode::Internal {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, code = code.as_str(), "Responding with error");
    }

    let mut error = json!({
      "status": code.status_name(),
      "message": self.client_message(),
    });
    if let AppError::Validation(messages) = self {
      error["details"] = json!(messages);
    }
    HttpResponse::build(code.http_status()).json(json!({ "error": error }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
