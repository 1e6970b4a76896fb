//! Document Store Module
//!
//! Collection/document persistence for the marketplace. Every document is a
//! JSON object addressed by `(collection, id)`; per-user subcollections use a
//! slash-separated collection path such as `users/{uid}/cart`.
//!
//! # Architecture
//!
//! - **`query`** - Typed filters, ordering and pagination
//! - **`batch`** - Field patches and atomic multi-document write batches
//! - **`memory`** - In-process store used for development and tests
//! - **`postgres`** - JSONB-backed store on a `documents` table
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - DocumentStore trait, Snapshot, StoreError
//! ├── query.rs     - Query, Filter, Direction
//! ├── batch.rs     - Patch, FieldValue, WriteBatch
//! ├── memory.rs    - MemoryStore
//! └── postgres.rs  - PgDocumentStore
//! ```
//!
//! # Atomicity
//!
//! All writes go through [`DocumentStore::commit`]. A batch either applies
//! completely or not at all, and its guards are evaluated against the same
//! state the writes are applied to. Workflows that move several documents
//! together (swap acceptance, payment verification) rely on this.

pub mod batch;
pub mod memory;
pub mod postgres;
pub mod query;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

pub use batch::{FieldValue, Patch, WriteBatch};
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;
pub use query::{Direction, Filter, Query};

/// A stored document body
pub type Document = Map<String, Value>;

/// A document read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub id: String,
    pub data: Document,
}

impl Snapshot {
    /// Document body with the id injected, as returned to clients
    pub fn to_json(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(data)
    }

    /// Deserialize into a typed document
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.to_json()).map_err(|source| StoreError::Decode {
            id: self.id.clone(),
            source,
        })
    }
}

/// Errors raised by document stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    #[error("document {collection}/{id} already exists")]
    AlreadyExists { collection: String, id: String },

    /// A batch guard did not hold; nothing was written
    #[error("precondition failed on {collection}/{id} ({field})")]
    PreconditionFailed {
        collection: String,
        id: String,
        field: String,
    },

    #[error("document must serialize to a JSON object")]
    NotAnObject,

    #[error("failed to decode document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Collection/document persistence
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError>;

    /// Number of documents matching the filters; ordering and pagination are ignored
    async fn count(&self, query: &Query) -> Result<usize, StoreError>;

    /// Apply a batch atomically and return its commit time
    async fn commit(&self, batch: WriteBatch) -> Result<DateTime<Utc>, StoreError>;
}

/// Generate an id for a new document
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Fetch and decode a single document
pub async fn get_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    collection: &str,
    id: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(collection, id).await? {
        Some(snapshot) => Ok(Some(snapshot.decode()?)),
        None => Ok(None),
    }
}

/// Run a query and decode every result
///
/// Documents that fail to decode are skipped with a warning so one malformed
/// record cannot break a listing.
pub async fn query_as<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    let snapshots = store.query(query).await?;
    Ok(snapshots
        .iter()
        .filter_map(|snapshot| match snapshot.decode() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(collection = %query.collection, "Skipping undecodable document: {}", e);
                None
            }
        })
        .collect())
}

/// Run a query and return raw JSON bodies with ids
pub async fn query_json(store: &dyn DocumentStore, query: &Query) -> Result<Vec<Value>, StoreError> {
    Ok(store.query(query).await?.iter().map(Snapshot::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_snapshot_injects_id() {
        let snapshot = Snapshot {
            id: "i1".into(),
            data: json!({ "title": "Bike" }).as_object().cloned().unwrap(),
        };
        assert_eq!(snapshot.to_json(), json!({ "id": "i1", "title": "Bike" }));
    }

    #[test]
    fn test_new_document_ids_are_unique() {
        let a = new_document_id();
        let b = new_document_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
    }
}
