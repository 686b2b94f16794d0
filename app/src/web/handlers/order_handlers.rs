// app/src/web/handlers/order_handlers.rs

//! Dashboard order management.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::cmp::Ordering;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::lifecycle;
use crate::models::{compute_total, Order, OrderItem, OrderStatus, OrderSubmission};
use crate::pipelines::contexts::SubmissionOrigin;
use crate::pipelines::submit_order::submit_order;
use crate::state::AppState;
use crate::store::{self, FieldFilter, Stored, ORDERS};
use crate::web::extractors::AuthenticatedAdmin;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
  #[default]
  OrderDate,
  OrderNumber,
  TotalPrice,
  DeliveryDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
  pub status: Option<String>,
  pub from: Option<NaiveDate>,
  pub to: Option<NaiveDate>,
  #[serde(default)]
  pub sort: SortKey,
  #[serde(default)]
  pub direction: SortDirection,
}

fn compare(a: &Order, b: &Order, key: SortKey) -> Ordering {
  match key {
    SortKey::OrderDate => a.order_date.cmp(&b.order_date),
    SortKey::OrderNumber => a.order_number.cmp(&b.order_number),
    SortKey::TotalPrice => a.total_price.cmp(&b.total_price),
    SortKey::DeliveryDate => a.delivery_date.cmp(&b.delivery_date),
  }
}

#[instrument(name = "handler::list_orders", skip(app_state, _admin))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, AppError> {
  let query = query.into_inner();
  let filter = match query.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    Some(raw) => {
      let status: OrderStatus = raw.parse().map_err(AppError::InvalidArgument)?;
      Some(FieldFilter::eq("status", status.as_str()))
    }
    None => None,
  };

  let offset = app_state.config.store_offset;
  let local_midnight = |date: NaiveDate| -> Result<DateTime<Utc>, AppError> {
    date
      .and_hms_opt(0, 0, 0)
      .and_then(|dt| dt.and_local_timezone(offset).single())
      .map(|dt| dt.with_timezone(&Utc))
      .ok_or_else(|| AppError::InvalidArgument(format!("Invalid date {}", date)))
  };
  let from = query.from.map(local_midnight).transpose()?;
  // `to` includes the whole day.
  let until = query
    .to
    .map(|date| {
      date
        .checked_add_days(Days::new(1))
        .ok_or_else(|| AppError::InvalidArgument(format!("Invalid date {}", date)))
        .and_then(local_midnight)
    })
    .transpose()?;

  let mut orders: Vec<Stored<Order>> = store::list_typed(app_state.store.as_ref(), ORDERS, filter).await?;
  orders.retain(|o| from.map_or(true, |f| o.data.order_date >= f) && until.map_or(true, |u| o.data.order_date < u));
  orders.sort_by(|a, b| {
    let ord = compare(&a.data, &b.data, query.sort);
    match query.direction {
      SortDirection::Asc => ord,
      SortDirection::Desc => ord.reverse(),
    }
  });

  info!(count = orders.len(), "Orders listed.");
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

/// Orders entered by staff are priced and numbered like storefront orders,
/// without the delivery-date and visibility restrictions.
#[instrument(name = "handler::create_order", skip_all)]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  payload: web::Json<OrderSubmission>,
) -> Result<HttpResponse, AppError> {
  let outcome = submit_order(app_state.get_ref(), payload.into_inner(), SubmissionOrigin::Dashboard).await?;
  info!(order_id = %outcome.response.order_id, "Order created from dashboard.");
  Ok(HttpResponse::Created().json(outcome.response))
}

/// Editable fields. `orderNumber` and `completionEmailSent` are not among them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEdit {
  pub customer_name: Option<String>,
  pub customer_address: Option<String>,
  pub customer_phone: Option<String>,
  pub customer_email: Option<String>,
  pub delivery_date: Option<NaiveDate>,
  pub meal_type: Option<String>,
  pub payment_method: Option<String>,
  pub serving_styles: Option<Vec<String>>,
  pub remarks: Option<String>,
  pub is_care_user: Option<bool>,
  pub status: Option<OrderStatus>,
  pub order_date: Option<DateTime<Utc>>,
  pub items: Option<Vec<OrderItem>>,
}

/// Applies `edit` to `order` and recomputes the total from the item snapshots.
pub fn apply_edit(order: &mut Order, edit: OrderEdit) -> Result<(), AppError> {
  if let Some(value) = edit.customer_name {
    order.customer_name = value;
  }
  if let Some(value) = edit.customer_address {
    order.customer_address = value;
  }
  if let Some(value) = edit.customer_phone {
    order.customer_phone = value;
  }
  if let Some(value) = edit.customer_email {
    order.customer_email = value;
  }
  if let Some(value) = edit.delivery_date {
    order.delivery_date = value;
  }
  if let Some(value) = edit.meal_type {
    order.meal_type = value;
  }
  if let Some(value) = edit.payment_method {
    order.payment_method = value;
  }
  if let Some(value) = edit.serving_styles {
    order.serving_styles = value;
  }
  if let Some(value) = edit.remarks {
    order.remarks = value;
  }
  if let Some(value) = edit.is_care_user {
    order.is_care_user = value;
  }
  if let Some(value) = edit.status {
    order.status = value;
  }
  if let Some(value) = edit.order_date {
    order.order_date = value;
  }

  if let Some(items) = edit.items {
    if items.is_empty() || items.iter().any(|i| i.quantity == 0) {
      return Err(AppError::InvalidArgument(
        "An order needs at least one item with a quantity of 1 or more.".to_string(),
      ));
    }
    order.items = items;
  }
  order.total_price = compute_total(&order.items)
    .ok_or_else(|| AppError::InvalidArgument("The order total is out of range.".to_string()))?;
  Ok(())
}

#[instrument(name = "handler::update_order", skip(app_state, _admin, payload), fields(order_id = %path.as_str()))]
pub async fn update_order_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
  payload: web::Json<OrderEdit>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let mut order = store::get_typed::<Order>(app_state.store.as_ref(), ORDERS, &order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} was not found.", order_id)))?
    .data;

  apply_edit(&mut order, payload.into_inner())?;

  // Only editable fields are written so the sequencer and the completion
  // latch are never overwritten by a stale copy.
  let mut fields = store::to_document(&order)?;
  if let Value::Object(map) = &mut fields {
    map.remove("orderNumber");
    map.remove("completionEmailSent");
  }
  app_state.store.update(ORDERS, &order_id, fields).await?;

  info!(total_price = order.total_price, "Order updated.");
  Ok(HttpResponse::Ok().json(json!({ "id": order_id, "totalPrice": order.total_price })))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
  pub status: String,
}

#[instrument(name = "handler::update_order_status", skip(app_state, _admin, payload), fields(order_id = %path.as_str()))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  _admin: AuthenticatedAdmin,
  path: web::Path<String>,
  payload: web::Json<StatusUpdate>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let status: OrderStatus = payload.status.parse().map_err(|e: String| {
    warn!(error = %e, "Rejected status update.");
    AppError::InvalidArgument(e)
  })?;
  lifecycle::set_status(app_state.store.as_ref(), &order_id, status).await?;
  Ok(HttpResponse::Ok().json(json!({ "id": order_id, "status": status })))
}
