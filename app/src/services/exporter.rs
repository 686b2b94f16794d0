// app/src/services/exporter.rs

//! Full-database export into archival storage.

use crate::store::{DocumentStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub enum ExportError {
  #[error("reading the document store failed: {0}")]
  Store(#[from] StoreError),

  #[error("serializing collection '{collection}' failed: {source}")]
  Serialization {
    collection: String,
    #[source]
    source: serde_json::Error,
  },

  #[error("I/O error at {}: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("an archive already exists at {}", .0.display())]
  AlreadyExists(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
  pub prefix: String,
  pub location: PathBuf,
  pub collections: Vec<String>,
  pub documents: usize,
}

#[async_trait]
pub trait DatabaseExporter: Send + Sync {
  /// Exports every collection under `prefix`. Either the whole archive is
  /// published or nothing is.
  async fn export_documents(&self, prefix: &str) -> Result<ExportReport, ExportError>;
}

/// `backups/<UTC timestamp without colons or fraction>`.
pub fn backup_prefix(now: DateTime<Utc>) -> String {
  format!("backups/{}", now.format("%Y-%m-%dT%H%M%S"))
}

/// Writes one `<collection>.json` per collection into a staging directory
/// next to the target and renames it into place once every file is written.
pub struct SnapshotExporter {
  store: Arc<dyn DocumentStore>,
  root: PathBuf,
}

impl SnapshotExporter {
  pub fn new(store: Arc<dyn DocumentStore>, root: impl Into<PathBuf>) -> Self {
    Self {
      store,
      root: root.into(),
    }
  }

  async fn write_collections(&self, staging: &Path) -> Result<(Vec<String>, usize), ExportError> {
    let collections = self.store.collections().await?;
    let mut documents = 0;

    for collection in &collections {
      let docs = self.store.list(collection, None).await?;
      documents += docs.len();
      let body: Vec<_> = docs.into_iter().map(|doc| json!({ "id": doc.id, "data": doc.data })).collect();
      let bytes = serde_json::to_vec_pretty(&body).map_err(|source| ExportError::Serialization {
        collection: collection.clone(),
        source,
      })?;
      let path = staging.join(format!("{}.json", collection));
      tokio::fs::write(&path, bytes).await.map_err(|source| ExportError::Io { path, source })?;
    }

    Ok((collections, documents))
  }
}

#[async_trait]
impl DatabaseExporter for SnapshotExporter {
  #[instrument(name = "exporter::snapshot", skip(self), err(Display))]
  async fn export_documents(&self, prefix: &str) -> Result<ExportReport, ExportError> {
    let target = self.root.join(prefix);
    let staging = self.root.join(format!("{}.partial", prefix));

    let exists = tokio::fs::try_exists(&target).await.map_err(|source| ExportError::Io {
      path: target.clone(),
      source,
    })?;
    if exists {
      return Err(ExportError::AlreadyExists(target));
    }
    tokio::fs::create_dir_all(&staging).await.map_err(|source| ExportError::Io {
      path: staging.clone(),
      source,
    })?;

    let written = match self.write_collections(&staging).await {
      Ok(written) => written,
      Err(e) => {
        discard_staging(&staging).await;
        return Err(e);
      }
    };

    if let Err(source) = tokio::fs::rename(&staging, &target).await {
      discard_staging(&staging).await;
      return Err(ExportError::Io { path: target, source });
    }

    let (collections, documents) = written;
    info!(location = %target.display(), collections = collections.len(), documents, "Export published.");
    Ok(ExportReport {
      prefix: prefix.to_string(),
      location: target,
      collections,
      documents,
    })
  }
}

async fn discard_staging(staging: &Path) {
  if let Err(e) = tokio::fs::remove_dir_all(staging).await {
    warn!(path = %staging.display(), error = %e, "Failed to remove export staging directory.");
  }
}
