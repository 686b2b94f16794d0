// app/src/web/callable.rs

//! Envelope of the callable protocol: requests carry `{"data": ..}`,
//! successful responses `{"result": ..}`.

use crate::errors::AppError;
use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

/// Extracts `data` from a callable request body. An empty body, a missing
/// `data` field and `"data": null` all read as `None`.
pub fn parse_callable<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(None);
  }
  let envelope: Value = serde_json::from_slice(body)?;
  match envelope.get("data") {
    None | Some(Value::Null) => Ok(None),
    Some(data) => Ok(Some(serde_json::from_value(data.clone())?)),
  }
}

pub fn callable_ok<T: Serialize>(result: T) -> HttpResponse {
  HttpResponse::Ok().json(json!({ "result": result }))
}
