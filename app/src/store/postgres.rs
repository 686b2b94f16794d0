// app/src/store/postgres.rs

use super::{new_document_id, Document, DocumentStore, FieldFilter, StoreError};
use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

/// Attempts before giving up on a counter whose first insert keeps racing.
const SEQUENCE_ATTEMPTS: u32 = 5;

const CREATE_TABLE: &str = r#"
  CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (collection, id)
  )
"#;

/// Document store backed by a single Postgres `documents` table with JSONB bodies.
#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
    let pool = PgPool::connect(database_url).await?;
    let store = Self::new(pool);
    store.ensure_schema().await?;
    Ok(store)
  }

  pub async fn ensure_schema(&self) -> Result<(), StoreError> {
    sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
    Ok(())
  }
}

fn require_object(collection: &str, id: &str, data: &Value) -> Result<(), StoreError> {
  if data.is_object() {
    Ok(())
  } else {
    Err(StoreError::Malformed {
      collection: collection.to_string(),
      id: id.to_string(),
      reason: "expected a JSON object".to_string(),
    })
  }
}

#[async_trait]
impl DocumentStore for PgStore {
  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
    let row: Option<(String, Json<Value>)> =
      sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 AND id = $2")
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
    Ok(row.map(|(id, Json(data))| Document { id, data }))
  }

  async fn list(&self, collection: &str, filter: Option<FieldFilter>) -> Result<Vec<Document>, StoreError> {
    let rows: Vec<(String, Json<Value>)> = match filter {
      None => {
        sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 ORDER BY id")
          .bind(collection)
          .fetch_all(&self.pool)
          .await?
      }
      Some(FieldFilter::Eq(field, value)) => {
        sqlx::query_as("SELECT id, data FROM documents WHERE collection = $1 AND data -> $2 = $3::jsonb ORDER BY id")
          .bind(collection)
          .bind(field)
          .bind(Json(value))
          .fetch_all(&self.pool)
          .await?
      }
    };
    Ok(rows.into_iter().map(|(id, Json(data))| Document { id, data }).collect())
  }

  async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
    let id = new_document_id();
    require_object(collection, &id, &data)?;
    sqlx::query("INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)")
      .bind(collection)
      .bind(&id)
      .bind(Json(data))
      .execute(&self.pool)
      .await?;
    Ok(id)
  }

  async fn set(&self, collection: &str, id: &str, data: Value, merge: bool) -> Result<(), StoreError> {
    require_object(collection, id, &data)?;
    let sql = if merge {
      "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
       ON CONFLICT (collection, id) DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()"
    } else {
      "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3)
       ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data, updated_at = now()"
    };
    sqlx::query(sql)
      .bind(collection)
      .bind(id)
      .bind(Json(data))
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn update(&self, collection: &str, id: &str, fields: Value) -> Result<(), StoreError> {
    require_object(collection, id, &fields)?;
    let affected = sqlx::query(
      "UPDATE documents SET data = data || $3, updated_at = now() WHERE collection = $1 AND id = $2",
    )
    .bind(collection)
    .bind(id)
    .bind(Json(fields))
    .execute(&self.pool)
    .await?
    .rows_affected();

    if affected == 0 {
      return Err(StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
      });
    }
    Ok(())
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
      .bind(collection)
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  async fn collections(&self) -> Result<Vec<String>, StoreError> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT collection FROM documents ORDER BY collection")
      .fetch_all(&self.pool)
      .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
  }

  #[instrument(skip(self), err(Display))]
  async fn next_sequence(&self, collection: &str, id: &str, field: &str, start: i64) -> Result<i64, StoreError> {
    for attempt in 1..=SEQUENCE_ATTEMPTS {
      let mut tx = self.pool.begin().await?;

      let row: Option<(Json<Value>,)> =
        sqlx::query_as("SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE")
          .bind(collection)
          .bind(id)
          .fetch_optional(&mut *tx)
          .await?;

      match row {
        Some((Json(data),)) => {
          let current = data.get(field).and_then(Value::as_i64).ok_or_else(|| StoreError::Malformed {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: format!("'{}' is not an integer", field),
          })?;
          let next = current + 1;

          sqlx::query(
            "UPDATE documents SET data = jsonb_set(data, ARRAY[$3::text], to_jsonb($4::bigint)), updated_at = now()
             WHERE collection = $1 AND id = $2",
          )
          .bind(collection)
          .bind(id)
          .bind(field)
          .bind(next)
          .execute(&mut *tx)
          .await?;

          tx.commit().await?;
          return Ok(next);
        }
        None => {
          // Another transaction may create the counter between our read and insert.
          let inserted = sqlx::query(
            "INSERT INTO documents (collection, id, data) VALUES ($1, $2, $3) ON CONFLICT (collection, id) DO NOTHING",
          )
          .bind(collection)
          .bind(id)
          .bind(Json(json!({ field: start })))
          .execute(&mut *tx)
          .await?
          .rows_affected();

          if inserted == 1 {
            tx.commit().await?;
            debug!(start, "Counter document created.");
            return Ok(start);
          }
          tx.rollback().await?;
          warn!(attempt, "Counter creation raced with another transaction, retrying.");
        }
      }
    }

    Err(StoreError::Contention {
      collection: collection.to_string(),
      id: id.to_string(),
      attempts: SEQUENCE_ATTEMPTS,
    })
  }
}
