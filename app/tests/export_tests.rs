// tests/export_tests.rs

mod common;

use bento_orders::errors::ErrorCode;
use bento_orders::pipelines::nightly_export::run_nightly_export;
use bento_orders::services::{DatabaseExporter, ExportError, SnapshotExporter};
use bento_orders::store::{DocumentStore, COUNTERS, ORDERS, ORDER_COUNTER_ID, PRODUCTS};
use chrono::{TimeZone, Utc};
use common::{harness, sample_order, seed_order, seed_product, FlakyStore};
use serde_json::{json, Value};
use serial_test::serial;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tempfile::TempDir;

const PREFIX: &str = "backups/2024-05-01T180000";

async fn populated_store() -> Arc<FlakyStore> {
  let store = Arc::new(FlakyStore::default());
  seed_product(store.as_ref(), json!({ "name": "Bento A", "price": 500, "isVisible": true })).await;
  seed_order(store.as_ref(), &sample_order()).await;
  seed_order(store.as_ref(), &sample_order()).await;
  store
    .set(COUNTERS, ORDER_COUNTER_ID, json!({ "currentNumber": 202 }), false)
    .await
    .unwrap();
  store
}

#[tokio::test]
#[serial]
async fn snapshot_publishes_every_collection() {
  let dir = TempDir::new().unwrap();
  let exporter = SnapshotExporter::new(populated_store().await, dir.path());

  let report = exporter.export_documents(PREFIX).await.unwrap();
  assert_eq!(report.documents, 4);
  assert_eq!(report.location, dir.path().join(PREFIX));
  for collection in [COUNTERS, ORDERS, PRODUCTS] {
    assert!(report.collections.iter().any(|c| c == collection));
  }

  let raw = std::fs::read_to_string(report.location.join("orders.json")).unwrap();
  let orders: Vec<Value> = serde_json::from_str(&raw).unwrap();
  assert_eq!(orders.len(), 2);
  assert_eq!(orders[0]["data"]["customerName"], "山田 太郎");
  assert!(orders[0]["id"].is_string());

  assert!(!dir.path().join(format!("{}.partial", PREFIX)).exists());
}

#[tokio::test]
#[serial]
async fn failed_read_publishes_nothing() {
  let dir = TempDir::new().unwrap();
  let store = populated_store().await;
  store.fail_list.lock().insert(PRODUCTS.to_string());
  let exporter = SnapshotExporter::new(store, dir.path());

  let err = exporter.export_documents(PREFIX).await.unwrap_err();
  assert!(matches!(err, ExportError::Store(_)));
  assert!(!dir.path().join(PREFIX).exists());
  assert!(!dir.path().join(format!("{}.partial", PREFIX)).exists());
}

#[tokio::test]
#[serial]
async fn existing_archive_is_never_overwritten() {
  let dir = TempDir::new().unwrap();
  let exporter = SnapshotExporter::new(populated_store().await, dir.path());

  exporter.export_documents(PREFIX).await.unwrap();
  let err = exporter.export_documents(PREFIX).await.unwrap_err();
  assert!(matches!(err, ExportError::AlreadyExists(_)));
  assert!(dir.path().join(PREFIX).join("orders.json").exists());
}

#[tokio::test]
#[serial]
async fn unreadable_target_is_reported_rather_than_treated_as_absent() {
  // A regular file as the export root makes the existence check itself fail.
  let root = tempfile::NamedTempFile::new().unwrap();
  let exporter = SnapshotExporter::new(populated_store().await, root.path());

  let err = exporter.export_documents(PREFIX).await.unwrap_err();
  match err {
    ExportError::Io { path, .. } => assert_eq!(path, root.path().join(PREFIX)),
    other => panic!("expected an io error on the target, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn nightly_run_stamps_the_prefix_with_the_start_time() {
  let h = harness();
  let started_at = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();

  let report = run_nightly_export(&h.state, started_at).await.unwrap();
  assert_eq!(report.prefix, PREFIX);
  assert_eq!(*h.exporter.prefixes.lock(), vec![PREFIX.to_string()]);
}

#[tokio::test]
#[serial]
async fn nightly_failure_is_reported_as_internal() {
  let h = harness();
  h.exporter.fail.store(true, Ordering::SeqCst);

  let err = run_nightly_export(&h.state, Utc::now()).await.unwrap_err();
  assert_eq!(err.code(), ErrorCode::Internal);
  assert_eq!(h.exporter.prefixes.lock().len(), 1);
}
