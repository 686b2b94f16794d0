// app/src/pipelines/contexts.rs

//! Context data for every pipeline. Handlers receive these wrapped in
//! `bento_flow::ContextData`.

use crate::models::{EmailTemplates, Order, OrderItem, OrderSubmission};
use crate::pipelines::public_data::PublicData;
use crate::sequencer::AssignOutcome;
use crate::services::{ExportReport, MessageId};
use crate::state::AppState;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::task::JoinHandle;

/// Who is placing an order. The dashboard may book any date and any product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOrigin {
  Storefront,
  Dashboard,
}

pub struct SubmitOrderCtxData {
  pub app_state: AppState,
  pub submission: OrderSubmission,
  pub origin: SubmissionOrigin,
  pub received_at: DateTime<Utc>,
  pub delivery_date: Option<NaiveDate>,
  pub priced_items: Vec<OrderItem>,
  pub total_price: i64,
  pub order_id: Option<String>,
  /// The background order-created run, for callers that want to wait on it.
  pub trigger: Option<JoinHandle<()>>,
}

impl SubmitOrderCtxData {
  pub fn new(app_state: AppState, submission: OrderSubmission, origin: SubmissionOrigin) -> Self {
    Self {
      app_state,
      submission,
      origin,
      received_at: Utc::now(),
      delivery_date: None,
      priced_items: Vec::new(),
      total_price: 0,
      order_id: None,
      trigger: None,
    }
  }
}

#[derive(Clone)]
pub struct OrderCreatedCtxData {
  pub app_state: AppState,
  pub order_id: String,
  pub order: Option<Order>,
  pub assignment: Option<AssignOutcome>,
  pub templates: EmailTemplates,
  pub customer_message: Option<MessageId>,
  pub admin_message: Option<MessageId>,
}

impl OrderCreatedCtxData {
  pub fn new(app_state: AppState, order_id: String) -> Self {
    Self {
      app_state,
      order_id,
      order: None,
      assignment: None,
      templates: EmailTemplates::default(),
      customer_message: None,
      admin_message: None,
    }
  }
}

#[derive(Clone)]
pub struct CompletionEmailCtxData {
  pub app_state: AppState,
  pub caller_authenticated: bool,
  pub requested_order_id: Option<String>,
  pub order_id: String,
  pub order: Option<Order>,
  pub templates: EmailTemplates,
  pub message_id: Option<MessageId>,
}

impl CompletionEmailCtxData {
  pub fn new(app_state: AppState, caller_authenticated: bool, requested_order_id: Option<String>) -> Self {
    Self {
      app_state,
      caller_authenticated,
      requested_order_id,
      order_id: String::new(),
      order: None,
      templates: EmailTemplates::default(),
      message_id: None,
    }
  }
}

#[derive(Clone)]
pub struct PublicDataCtxData {
  pub app_state: AppState,
  pub payload: Option<PublicData>,
}

#[derive(Clone)]
pub struct NightlyExportCtxData {
  pub app_state: AppState,
  pub started_at: DateTime<Utc>,
  pub prefix: String,
  pub report: Option<ExportReport>,
}
