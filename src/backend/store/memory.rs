/**
 * In-Memory Document Store
 *
 * Keeps every collection in a `BTreeMap` behind a single `tokio::sync::RwLock`.
 * Reads share the lock; a commit holds the write lock for the whole batch,
 * which is what makes batches atomic here. Used when `DATABASE_URL` is not
 * set and by the test suite.
 */

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::batch::Staging;
use super::{Document, DocumentStore, Query, Snapshot, StoreError, WriteBatch};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching(
        collections: &HashMap<String, BTreeMap<String, Document>>,
        query: &Query,
    ) -> Vec<Snapshot> {
        collections
            .get(&query.collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, data)| query.matches(data))
                    .map(|(id, data)| Snapshot {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Snapshot {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let collections = self.collections.read().await;
        Ok(query.arrange(Self::matching(&collections, query)))
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&query.collection)
            .map(|docs| {
                docs.values()
                    .filter(|data| query.filters.iter().all(|f| f.matches(data)))
                    .count()
            })
            .unwrap_or(0))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<DateTime<Utc>, StoreError> {
        let mut collections = self.collections.write().await;
        let commit_time = Utc::now();

        let mut staging: Staging = batch
            .touched()
            .into_iter()
            .map(|(collection, id)| {
                let current = collections
                    .get(&collection)
                    .and_then(|docs| docs.get(&id))
                    .cloned();
                ((collection, id), current)
            })
            .collect();

        batch.apply(&mut staging, &commit_time)?;

        for ((collection, id), doc) in staging {
            match doc {
                Some(doc) => {
                    collections.entry(collection).or_default().insert(id, doc);
                }
                None => {
                    if let Some(docs) = collections.get_mut(&collection) {
                        docs.remove(&id);
                    }
                }
            }
        }

        Ok(commit_time)
    }
}
