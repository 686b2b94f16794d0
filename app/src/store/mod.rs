// app/src/store/mod.rs

//! The narrow interface to the document database.
//!
//! Documents are JSON objects addressed by `(collection, id)`. The only
//! transactional primitive is [`DocumentStore::next_sequence`]; every other
//! write is last-writer-wins.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const ORDERS: &str = "orders";
pub const PRODUCTS: &str = "products";
pub const SERVING_STYLES: &str = "servingStyles";
pub const PAYMENT_METHODS: &str = "paymentMethods";
pub const COUNTERS: &str = "counters";
pub const SETTINGS: &str = "settings";

pub const ORDER_COUNTER_ID: &str = "order_counter";
pub const ORDER_COUNTER_FIELD: &str = "currentNumber";
pub const EMAIL_TEMPLATES_ID: &str = "emailTemplates";
pub const STORE_INFO_ID: &str = "storeInfo";

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("document {collection}/{id} not found")]
  NotFound { collection: String, id: String },

  #[error("document {collection}/{id} is malformed: {reason}")]
  Malformed {
    collection: String,
    id: String,
    reason: String,
  },

  #[error("counter {collection}/{id} stayed contended after {attempts} attempts")]
  Contention {
    collection: String,
    id: String,
    attempts: u32,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id: String,
  pub data: Value,
}

/// Equality filter on one top-level field.
#[derive(Debug, Clone)]
pub enum FieldFilter {
  Eq(String, Value),
}

impl FieldFilter {
  pub fn eq(field: &str, value: impl Into<Value>) -> Self {
    FieldFilter::Eq(field.to_string(), value.into())
  }

  pub fn matches(&self, data: &Value) -> bool {
    match self {
      FieldFilter::Eq(field, expected) => data.get(field) == Some(expected),
    }
  }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

  async fn list(&self, collection: &str, filter: Option<FieldFilter>) -> Result<Vec<Document>, StoreError>;

  /// Stores `data` under a new store-assigned id and returns that id.
  async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError>;

  /// Writes the whole document, or with `merge` only its top-level fields.
  async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError>;

  /// Merges `fields` into an existing document. Fails with `NotFound` otherwise.
  async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError>;

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

  /// Names of all collections holding at least one document.
  async fn collections(&self) -> Result<Vec<String>, StoreError>;

  /// Atomically advances the integer `field` of a counter document and returns
  /// the new value. A missing counter is created holding `start`, which is
  /// returned as the first value.
  async fn next_sequence(&self, collection: &str, id: &str, field: &str, start: i64) -> Result<i64, StoreError>;
}

/// A typed document together with its id. Serializes as `{ "id": .., ..fields }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
  pub id: String,
  #[serde(flatten)]
  pub data: T,
}

pub fn decode<T: DeserializeOwned>(collection: &str, doc: Document) -> Result<Stored<T>, StoreError> {
  let data = serde_json::from_value(doc.data).map_err(|e| StoreError::Malformed {
    collection: collection.to_string(),
    id: doc.id.clone(),
    reason: e.to_string(),
  })?;
  Ok(Stored { id: doc.id, data })
}

pub async fn get_typed<T: DeserializeOwned>(
  store: &dyn DocumentStore,
  collection: &str,
  id: &str,
) -> Result<Option<Stored<T>>, StoreError> {
  store.get(collection, id).await?.map(|doc| decode(collection, doc)).transpose()
}

pub async fn list_typed<T: DeserializeOwned>(
  store: &dyn DocumentStore,
  collection: &str,
  filter: Option<FieldFilter>,
) -> Result<Vec<Stored<T>>, StoreError> {
  store
    .list(collection, filter)
    .await?
    .into_iter()
    .map(|doc| decode(collection, doc))
    .collect()
}

pub fn to_document<T: Serialize>(value: &T) -> Result<Value, StoreError> {
  Ok(serde_json::to_value(value)?)
}

pub fn new_document_id() -> String {
  uuid::Uuid::new_v4().simple().to_string()
}

/// Shallow merge of `fields` into `target`; both must be JSON objects.
pub(crate) fn merge_fields(target: &mut Value, fields: Value) -> Result<(), String> {
  let incoming = into_object(fields)?;
  let existing = target.as_object_mut().ok_or("stored document is not an object")?;
  for (key, value) in incoming {
    existing.insert(key, value);
  }
  Ok(())
}

pub(crate) fn into_object(value: Value) -> Result<Map<String, Value>, String> {
  match value {
    Value::Object(map) => Ok(map),
    other => Err(format!("expected a JSON object, got {}", other)),
  }
}
