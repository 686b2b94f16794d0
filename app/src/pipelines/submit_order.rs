// app/src/pipelines/submit_order.rs

//! `submitOrder`: validate, price on the server, store, then hand off to the
//! order-created trigger.

use crate::errors::{AppError, Result};
use crate::models::{compute_total, resolve_price, Order, OrderItem, OrderStatus, OrderSubmission, Product};
use crate::pipelines::contexts::{SubmissionOrigin, SubmitOrderCtxData};
use crate::state::AppState;
use crate::store::{self, ORDERS, PRODUCTS};
use crate::triggers;
use crate::validation::{self, SubmissionRules, MSG_QUANTITY_TOO_LARGE};
use bento_flow::{ContextData, Pipeline, PipelineControl, PipelineResult, Registry};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOrderResponse {
  pub order_id: String,
  pub total_price: i64,
}

#[derive(Debug)]
pub struct SubmitOutcome {
  pub response: SubmitOrderResponse,
  pub trigger: Option<JoinHandle<()>>,
}

const MSG_ORDER_TOO_LARGE: &str = "ご注文の合計金額が上限を超えています。";

pub fn register_submit_order_pipeline(registry: &Registry<AppError>, _app_state: &AppState) {
  let mut p = Pipeline::<SubmitOrderCtxData, AppError>::new(&[
    ("validate_submission", false, None),
    ("price_items", false, None),
    ("persist_order", false, None),
    ("fire_created_trigger", false, None),
  ]);

  p.on("validate_submission", |ctx: ContextData<SubmitOrderCtxData>| async move {
    let outcome = {
      let guard = ctx.read();
      let config = &guard.app_state.config;
      let rules = SubmissionRules {
        earliest_delivery: match guard.origin {
          SubmissionOrigin::Storefront => Some(validation::earliest_delivery_date(
            guard.received_at,
            config.store_offset,
            config.order_cutoff_hour,
          )),
          SubmissionOrigin::Dashboard => None,
        },
      };
      validation::validate_submission(&guard.submission, rules)
    };

    match outcome {
      Ok(delivery_date) => {
        ctx.write().delivery_date = Some(delivery_date);
        Ok::<_, AppError>(PipelineControl::Continue)
      }
      Err(messages) => {
        warn!(problems = messages.len(), "Order submission rejected.");
        Err(AppError::Validation(messages))
      }
    }
  });

  p.on("price_items", |ctx: ContextData<SubmitOrderCtxData>| async move {
    let (app_state, selections, is_care_user, origin) = {
      let guard = ctx.read();
      (
        guard.app_state.clone(),
        guard.submission.items.clone(),
        guard.submission.is_care_user,
        guard.origin,
      )
    };

    let mut items = Vec::with_capacity(selections.len());
    let mut problems = Vec::new();
    for selection in selections {
      match store::get_typed::<Product>(app_state.store.as_ref(), PRODUCTS, &selection.product_id).await? {
        None => problems.push(format!("選択された商品が見つかりません（{}）。", selection.product_id)),
        Some(product) if !product.data.is_visible && origin == SubmissionOrigin::Storefront => {
          problems.push(format!("「{}」は現在ご注文いただけません。", product.data.name))
        }
        Some(product) => match u32::try_from(selection.quantity) {
          Ok(quantity) => items.push(OrderItem {
            product_id: product.id,
            price: resolve_price(&product.data, is_care_user),
            name: product.data.name,
            quantity,
          }),
          Err(_) => problems.push(MSG_QUANTITY_TOO_LARGE.to_string()),
        },
      }
    }
    if !problems.is_empty() {
      return Err(AppError::Validation(problems));
    }

    let total = compute_total(&items).ok_or_else(|| AppError::Validation(vec![MSG_ORDER_TOO_LARGE.to_string()]))?;
    let mut guard = ctx.write();
    guard.priced_items = items;
    guard.total_price = total;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("persist_order", |ctx: ContextData<SubmitOrderCtxData>| async move {
    let (app_state, order) = {
      let guard = ctx.read();
      let delivery_date = guard
        .delivery_date
        .ok_or_else(|| AppError::Internal("Delivery date missing after validation.".to_string()))?;
      let s = &guard.submission;
      let order = Order {
        order_number: None,
        status: OrderStatus::Pending,
        items: guard.priced_items.clone(),
        total_price: guard.total_price,
        customer_name: s.customer_name.trim().to_string(),
        customer_address: s.customer_address.trim().to_string(),
        customer_phone: s.customer_phone.trim().to_string(),
        customer_email: s.customer_email.trim().to_string(),
        delivery_date,
        meal_type: s.meal_type.clone(),
        payment_method: s.payment_method.clone(),
        serving_styles: s.serving_styles.clone(),
        remarks: s.remarks.clone(),
        is_care_user: s.is_care_user,
        order_date: guard.received_at,
        completion_email_sent: false,
      };
      (guard.app_state.clone(), order)
    };

    let order_id = app_state.store.insert(ORDERS, store::to_document(&order)?).await?;
    info!(%order_id, total_price = order.total_price, items = order.items.len(), "Order stored.");
    ctx.write().order_id = Some(order_id);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("fire_created_trigger", |ctx: ContextData<SubmitOrderCtxData>| async move {
    let (app_state, order_id) = {
      let guard = ctx.read();
      (guard.app_state.clone(), guard.order_id.clone())
    };
    let order_id = order_id.ok_or_else(|| AppError::Internal("Order id missing after insert.".to_string()))?;
    let handle = triggers::dispatch_order_created(&app_state, order_id);
    ctx.write().trigger = Some(handle);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  registry.register_pipeline(p);
}

/// Runs the submission pipeline and returns once the order is stored.
#[instrument(name = "pipelines::submit_order", skip(app_state, submission), fields(items = submission.items.len()))]
pub async fn submit_order(
  app_state: &AppState,
  submission: OrderSubmission,
  origin: SubmissionOrigin,
) -> Result<SubmitOutcome> {
  let ctx = ContextData::new(SubmitOrderCtxData::new(app_state.clone(), submission, origin));

  match app_state.flows.run(ctx.clone()).await? {
    PipelineResult::Completed => {
      let mut guard = ctx.write();
      let order_id = guard
        .order_id
        .clone()
        .ok_or_else(|| AppError::Internal("Order submission completed without an order id.".to_string()))?;
      Ok(SubmitOutcome {
        response: SubmitOrderResponse {
          order_id,
          total_price: guard.total_price,
        },
        trigger: guard.trigger.take(),
      })
    }
    PipelineResult::Stopped => Err(AppError::Internal("Order submission was halted.".to_string())),
  }
}
