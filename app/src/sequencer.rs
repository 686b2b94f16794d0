// app/src/sequencer.rs

//! Issues order numbers from the `counters/order_counter` document.

use crate::errors::{AppError, Result};
use crate::models::Order;
use crate::store::{self, DocumentStore, COUNTERS, ORDERS, ORDER_COUNTER_FIELD, ORDER_COUNTER_ID};
use serde_json::json;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
  /// A new number was drawn from the counter and written onto the order.
  Assigned(i64),
  /// The order already carried a number (redelivered trigger); the counter was not touched.
  AlreadyAssigned(i64),
}

impl AssignOutcome {
  pub fn number(self) -> i64 {
    match self {
      AssignOutcome::Assigned(n) | AssignOutcome::AlreadyAssigned(n) => n,
    }
  }
}

/// Gives `order_id` its order number.
///
/// The counter increment is the only transactional write. Writing the number
/// onto the order happens afterwards; if that write fails the drawn number is
/// lost and the error is returned.
#[instrument(name = "sequencer::assign_order_number", skip(store), err(Display))]
pub async fn assign_order_number(store: &dyn DocumentStore, order_id: &str, start: i64) -> Result<AssignOutcome> {
  let order = store::get_typed::<Order>(store, ORDERS, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} does not exist.", order_id)))?;

  if let Some(existing) = order.data.order_number {
    info!(order_number = existing, "Order already numbered, skipping counter.");
    return Ok(AssignOutcome::AlreadyAssigned(existing));
  }

  let number = store
    .next_sequence(COUNTERS, ORDER_COUNTER_ID, ORDER_COUNTER_FIELD, start)
    .await
    .map_err(|e| {
      error!(error = %e, "Order counter transaction failed.");
      AppError::from(e)
    })?;

  store
    .update(ORDERS, order_id, json!({ "orderNumber": number }))
    .await
    .map_err(|e| {
      error!(order_number = number, error = %e, "Counter advanced but the order could not be updated.");
      AppError::from(e)
    })?;

  info!(order_number = number, "Order number assigned.");
  Ok(AssignOutcome::Assigned(number))
}
