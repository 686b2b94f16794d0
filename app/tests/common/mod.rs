// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use bento_orders::config::AppConfig;
use bento_orders::models::{Order, OrderItem, OrderStatus};
use bento_orders::services::auth_service;
use bento_orders::services::{
  DatabaseExporter, ExportError, ExportReport, MailError, Mailer, MessageId, OutgoingEmail,
};
use bento_orders::state::AppState;
use bento_orders::store::{
  self, Document, DocumentStore, FieldFilter, MemoryStore, StoreError, EMAIL_TEMPLATES_ID, ORDERS, PRODUCTS, SETTINGS,
};
use bento_orders::validation;
use chrono::{Days, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;

pub const APP_CHECK_TOKEN: &str = "test-app-check-token";
pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const SHOP_FROM: &str = "shop@bento.example";
pub const SHOP_ADMIN: &str = "owner@bento.example";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// Argon2 is slow in debug builds; hash once per test binary.
static ADMIN_TOKEN_HASH: Lazy<String> = Lazy::new(|| auth_service::hash_admin_token(ADMIN_TOKEN).unwrap());

pub fn test_config() -> AppConfig {
  AppConfig {
    app_check_tokens: vec![APP_CHECK_TOKEN.to_string()],
    admin_token_hash: Some(ADMIN_TOKEN_HASH.clone()),
    ..AppConfig::default()
  }
}

// --- Mailer fake ---

#[derive(Default)]
pub struct RecordingMailer {
  sent: Mutex<Vec<OutgoingEmail>>,
  attempts: AtomicUsize,
  fail_all: AtomicBool,
  fail_recipients: Mutex<HashSet<String>>,
}

impl RecordingMailer {
  pub fn sent(&self) -> Vec<OutgoingEmail> {
    self.sent.lock().clone()
  }

  pub fn sent_to(&self, recipient: &str) -> Vec<OutgoingEmail> {
    self.sent().into_iter().filter(|m| m.to == recipient).collect()
  }

  pub fn attempts(&self) -> usize {
    self.attempts.load(Ordering::SeqCst)
  }

  pub fn fail_everything(&self, fail: bool) {
    self.fail_all.store(fail, Ordering::SeqCst);
  }

  pub fn fail_for(&self, recipient: &str) {
    self.fail_recipients.lock().insert(recipient.to_string());
  }
}

#[async_trait]
impl Mailer for RecordingMailer {
  async fn send(&self, email: OutgoingEmail) -> Result<MessageId, MailError> {
    let n = self.attempts.fetch_add(1, Ordering::SeqCst);
    if self.fail_all.load(Ordering::SeqCst) || self.fail_recipients.lock().contains(&email.to) {
      return Err(MailError::Rejected {
        status: 503,
        body: "provider unavailable".to_string(),
      });
    }
    self.sent.lock().push(email);
    Ok(MessageId(format!("test-message-{}", n)))
  }
}

// --- Exporter fake ---

#[derive(Default)]
pub struct StubExporter {
  pub fail: AtomicBool,
  pub prefixes: Mutex<Vec<String>>,
}

#[async_trait]
impl DatabaseExporter for StubExporter {
  async fn export_documents(&self, prefix: &str) -> Result<ExportReport, ExportError> {
    self.prefixes.lock().push(prefix.to_string());
    if self.fail.load(Ordering::SeqCst) {
      return Err(ExportError::Io {
        path: PathBuf::from(prefix),
        source: std::io::Error::new(std::io::ErrorKind::Other, "export backend unavailable"),
      });
    }
    Ok(ExportReport {
      prefix: prefix.to_string(),
      location: PathBuf::from("stub").join(prefix),
      collections: vec![ORDERS.to_string()],
      documents: 0,
    })
  }
}

// --- Store wrapper with failure switches ---

#[derive(Default)]
pub struct FlakyStore {
  pub inner: MemoryStore,
  pub fail_sequence: AtomicBool,
  pub fail_list: Mutex<HashSet<String>>,
}

fn unavailable() -> StoreError {
  StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl DocumentStore for FlakyStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    self.inner.get(collection, id).await
  }

  async fn list(&self, collection: &str, filter: Option<FieldFilter>) -> Result<Vec<Document>, StoreError> {
    if self.fail_list.lock().contains(collection) {
      return Err(unavailable());
    }
    self.inner.list(collection, filter).await
  }

  async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
    self.inner.insert(collection, data).await
  }

  async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError> {
    self.inner.set(collection, id, data, merge).await
  }

  async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
    self.inner.update(collection, id, fields).await
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    self.inner.delete(collection, id).await
  }

  async fn collections(&self) -> Result<Vec<String>, StoreError> {
    self.inner.collections().await
  }

  async fn next_sequence(&self, collection: &str, id: &str, field: &str, start: i64) -> Result<i64, StoreError> {
    if self.fail_sequence.load(Ordering::SeqCst) {
      return Err(unavailable());
    }
    self.inner.next_sequence(collection, id, field, start).await
  }
}

// --- Harness ---

pub struct Harness {
  pub state: AppState,
  pub store: Arc<FlakyStore>,
  pub mailer: Arc<RecordingMailer>,
  pub exporter: Arc<StubExporter>,
}

pub fn harness() -> Harness {
  harness_with_config(test_config())
}

pub fn harness_with_config(config: AppConfig) -> Harness {
  setup_tracing();
  let store = Arc::new(FlakyStore::default());
  let mailer = Arc::new(RecordingMailer::default());
  let exporter = Arc::new(StubExporter::default());
  let state = AppState::new(config, store.clone(), mailer.clone(), exporter.clone());
  Harness {
    state,
    store,
    mailer,
    exporter,
  }
}

// --- Fixtures ---

pub async fn seed_product(store: &dyn DocumentStore, data: Value) -> String {
  store.insert(PRODUCTS, data).await.unwrap()
}

pub async fn seed_templates(store: &dyn DocumentStore, templates: Value) {
  store.set(SETTINGS, EMAIL_TEMPLATES_ID, templates, false).await.unwrap();
}

pub async fn seed_sender_and_admin(store: &dyn DocumentStore) {
  seed_templates(store, json!({ "fromEmail": SHOP_FROM, "adminEmail": SHOP_ADMIN })).await;
}

pub fn sample_order() -> Order {
  Order {
    order_number: None,
    status: OrderStatus::Pending,
    items: vec![
      OrderItem {
        product_id: "p-a".to_string(),
        name: "Bento A".to_string(),
        quantity: 2,
        price: 500,
      },
      OrderItem {
        product_id: "p-b".to_string(),
        name: "Bento B".to_string(),
        quantity: 1,
        price: 300,
      },
    ],
    total_price: 1300,
    customer_name: "山田 太郎".to_string(),
    customer_address: "東京都千代田区1-1".to_string(),
    customer_phone: "090-1234-5678".to_string(),
    customer_email: "taro@example.com".to_string(),
    delivery_date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
    meal_type: "昼食".to_string(),
    payment_method: "現金".to_string(),
    serving_styles: vec!["刻み".to_string(), "おかゆ".to_string()],
    remarks: "玄関前に置いてください".to_string(),
    is_care_user: false,
    order_date: Utc.with_ymd_and_hms(2024, 5, 1, 1, 30, 0).unwrap(),
    completion_email_sent: false,
  }
}

pub async fn seed_order(store: &dyn DocumentStore, order: &Order) -> String {
  store.insert(ORDERS, store::to_document(order).unwrap()).await.unwrap()
}

pub async fn load_order(store: &dyn DocumentStore, order_id: &str) -> Order {
  store::get_typed::<Order>(store, ORDERS, order_id)
    .await
    .unwrap()
    .expect("order exists")
    .data
}

/// A delivery date every storefront rule accepts, whatever the time of day.
pub fn valid_delivery_date(config: &AppConfig) -> String {
  validation::earliest_delivery_date(Utc::now(), config.store_offset, config.order_cutoff_hour)
    .checked_add_days(Days::new(1))
    .unwrap()
    .format("%Y-%m-%d")
    .to_string()
}
