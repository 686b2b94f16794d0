// app/src/triggers.rs

//! Document-created trigger for `orders`.

use crate::pipelines::order_created::run_order_created;
use crate::state::AppState;
use tokio::task::JoinHandle;
use tracing::{error, info, Instrument};

/// Starts the order-created pipeline in the background. Failures are logged
/// only; nothing is reported back to whoever stored the order.
pub fn dispatch_order_created(app_state: &AppState, order_id: String) -> JoinHandle<()> {
  let app_state = app_state.clone();
  let span = tracing::info_span!("trigger::order_created", %order_id);

  tokio::spawn(
    async move {
      match run_order_created(&app_state, &order_id).await {
        Ok(summary) => info!(
          assignment = ?summary.assignment,
          customer_email_sent = summary.customer_email_sent,
          admin_email_sent = summary.admin_email_sent,
          "Order-created trigger finished."
        ),
        Err(e) => error!(error = %e, "Order-created trigger failed."),
      }
    }
    .instrument(span),
  )
}
