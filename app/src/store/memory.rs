// app/src/store/memory.rs

use super::{into_object, merge_fields, new_document_id, Document, DocumentStore, FieldFilter, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::BTreeMap;

type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// In-process document store. Used when no database is configured and by tests.
///
/// One mutex guards every collection, so a counter read-modify-write is
/// serialized against all other writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
  collections: Mutex<Collections>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn malformed(collection: &str, id: &str, reason: String) -> StoreError {
  StoreError::Malformed {
    collection: collection.to_string(),
    id: id.to_string(),
    reason,
  }
}

#[async_trait]
impl DocumentStore for MemoryStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    let guard = self.collections.lock();
    Ok(guard.get(collection).and_then(|docs| docs.get(id)).map(|data| Document {
      id: id.to_string(),
      data: data.clone(),
    }))
  }

  async fn list(&self, collection: &str, filter: Option<FieldFilter>) -> Result<Vec<Document>, StoreError> {
    let guard = self.collections.lock();
    let Some(docs) = guard.get(collection) else {
      return Ok(Vec::new());
    };
    Ok(
      docs
        .iter()
        .filter(|(_, data)| filter.as_ref().map_or(true, |f| f.matches(data)))
        .map(|(id, data)| Document {
          id: id.clone(),
          data: data.clone(),
        })
        .collect(),
    )
  }

  async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
    let id = new_document_id();
    let data = into_object(data).map_err(|reason| malformed(collection, &id, reason))?;
    self
      .collections
      .lock()
      .entry(collection.to_string())
      .or_default()
      .insert(id.clone(), Value::Object(data));
    Ok(id)
  }

  async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError> {
    let data = Value::Object(into_object(data).map_err(|reason| malformed(collection, id, reason))?);
    let mut guard = self.collections.lock();
    let docs = guard.entry(collection.to_string()).or_default();
    match docs.get_mut(id) {
      Some(existing) if merge => merge_fields(existing, data).map_err(|reason| malformed(collection, id, reason))?,
      _ => {
        docs.insert(id.to_string(), data);
      }
    }
    Ok(())
  }

  async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
    let mut guard = self.collections.lock();
    let existing = guard
      .get_mut(collection)
      .and_then(|docs| docs.get_mut(id))
      .ok_or_else(|| StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      })?;
    merge_fields(existing, fields).map_err(|reason| malformed(collection, id, reason))
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    if let Some(docs) = self.collections.lock().get_mut(collection) {
      docs.remove(id);
    }
    Ok(())
  }

  async fn collections(&self) -> Result<Vec<String>, StoreError> {
    let guard = self.collections.lock();
    Ok(
      guard
        .iter()
        .filter(|(_, docs)| !docs.is_empty())
        .map(|(name, _)| name.clone())
        .collect(),
    )
  }

  async fn next_sequence(&self, collection: &str, id: &str, field: &str, start: i64) -> Result<i64, StoreError> {
    let mut guard = self.collections.lock();
    let docs = guard.entry(collection.to_string()).or_default();
    match docs.get_mut(id) {
      None => {
        docs.insert(id.to_string(), json!({ field: start }));
        Ok(start)
      }
      Some(counter) => {
        let current = counter
          .get(field)
          .and_then(Value::as_i64)
          .ok_or_else(|| malformed(collection, id, format!("'{}' is not an integer", field)))?;
        let next = current + 1;
        merge_fields(counter, json!({ field: next })).map_err(|reason| malformed(collection, id, reason))?;
        Ok(next)
      }
    }
  }
}
