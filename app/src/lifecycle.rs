// app/src/lifecycle.rs

//! Order status changes and the one-way `completionEmailSent` latch.

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderStatus};
use crate::store::{DocumentStore, ORDERS};
use serde_json::json;
use tracing::{info, instrument};

/// Whether the completion email may be sent for `order` now.
pub fn ensure_completion_allowed(order: &Order) -> Result<()> {
  if order.completion_email_sent {
    return Err(AppError::AlreadyExists(
      "The completion email has already been sent for this order.".to_string(),
    ));
  }
  if order.status != OrderStatus::Done {
    return Err(AppError::FailedPrecondition(format!(
      "The completion email can only be sent once the order is {} (current status: {}).",
      OrderStatus::Done,
      order.status
    )));
  }
  Ok(())
}

/// Staff may move an order between any two statuses.
#[instrument(name = "lifecycle::set_status", skip(store), err(Display))]
pub async fn set_status(store: &dyn DocumentStore, order_id: &str, status: OrderStatus) -> Result<()> {
  store.update(ORDERS, order_id, json!({ "status": status })).await?;
  info!(status = %status, "Order status updated.");
  Ok(())
}

/// Sets `completionEmailSent`. There is no operation that clears it.
#[instrument(name = "lifecycle::latch_completion_email_sent", skip(store), err(Display))]
pub async fn latch_completion_email_sent(store: &dyn DocumentStore, order_id: &str) -> Result<()> {
  store.update(ORDERS, order_id, json!({ "completionEmailSent": true })).await?;
  Ok(())
}
