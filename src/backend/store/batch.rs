/**
 * Write Batches
 *
 * A `WriteBatch` groups writes to several documents that must land together.
 * Stores apply a batch atomically: either every guard holds and every write
 * is applied, or nothing changes.
 *
 * # Staging
 *
 * Both store implementations load the current version of every document the
 * batch touches into a staging map, call [`WriteBatch::apply`] and persist the
 * result. Keeping the evaluation here means the in-memory and PostgreSQL
 * stores cannot disagree about batch semantics.
 */

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::query::{lookup, values_equal};
use super::{Document, StoreError};
use crate::shared::time::format_timestamp;

/// `(collection, id)` pair
pub type DocKey = (String, String);

/// Current version of every touched document; `None` means absent
pub type Staging = BTreeMap<DocKey, Option<Document>>;

/// Value written to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Set(Value),
    /// Add to the current number, treating a missing field as zero
    Increment(i64),
    /// Commit time of the batch
    ServerTimestamp,
    Delete,
}

/// Field-level changes to one document, applied in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Vec<(String, FieldValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch that sets every top-level field of a serialized document
    ///
    /// The `id` key is dropped; ids live in the document key, not the body.
    pub fn from_document<T: Serialize>(document: &T) -> Result<Self, StoreError> {
        let value = serde_json::to_value(document)?;
        let Value::Object(map) = value else {
            return Err(StoreError::NotAnObject);
        };
        Ok(Self {
            fields: map
                .into_iter()
                .filter(|(key, _)| key != "id")
                .map(|(key, value)| (key, FieldValue::Set(value)))
                .collect(),
        })
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((field.into(), FieldValue::Set(value.into())));
        self
    }

    pub fn increment(mut self, field: impl Into<String>, by: i64) -> Self {
        self.fields.push((field.into(), FieldValue::Increment(by)));
        self
    }

    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), FieldValue::ServerTimestamp));
        self
    }

    pub fn delete(mut self, field: impl Into<String>) -> Self {
        self.fields.push((field.into(), FieldValue::Delete));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply the patch to a document body
    pub fn apply(&self, target: &mut Document, now: &str) {
        for (path, change) in &self.fields {
            let (parents, leaf) = match path.rsplit_once('.') {
                Some((parents, leaf)) => (Some(parents), leaf),
                None => (None, path.as_str()),
            };
            let Some(container) = container_for(target, parents) else {
                continue;
            };
            match change {
                FieldValue::Set(value) => {
                    container.insert(leaf.to_string(), value.clone());
                }
                FieldValue::Increment(by) => {
                    let next = increment_value(container.get(leaf), *by);
                    container.insert(leaf.to_string(), next);
                }
                FieldValue::ServerTimestamp => {
                    container.insert(leaf.to_string(), Value::String(now.to_string()));
                }
                FieldValue::Delete => {
                    container.remove(leaf);
                }
            }
        }
    }
}

/// Walk (creating as needed) the objects above a dotted leaf
fn container_for<'a>(target: &'a mut Document, parents: Option<&str>) -> Option<&'a mut Map<String, Value>> {
    let mut current = target;
    if let Some(parents) = parents {
        for segment in parents.split('.') {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry.as_object_mut()?;
        }
    }
    Some(current)
}

fn increment_value(current: Option<&Value>, by: i64) -> Value {
    match current.and_then(Value::as_number) {
        Some(n) if n.is_i64() || n.is_u64() => {
            let base = n.as_i64().unwrap_or(i64::MAX);
            Value::from(base.saturating_add(by))
        }
        Some(n) => Value::from(n.as_f64().unwrap_or_default() + by as f64),
        None => Value::from(by),
    }
}

/// `field == value` must hold on a stored document for the batch to commit
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub collection: String,
    pub id: String,
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    /// Fails if the document already exists
    Create { collection: String, id: String, patch: Patch },
    /// Replace the document, or merge into it when `merge` is set
    Set { collection: String, id: String, patch: Patch, merge: bool },
    /// Fails if the document does not exist
    Update { collection: String, id: String, patch: Patch },
    /// Deleting a missing document is not an error
    Delete { collection: String, id: String },
}

impl Write {
    fn key(&self) -> DocKey {
        match self {
            Write::Create { collection, id, .. }
            | Write::Set { collection, id, .. }
            | Write::Update { collection, id, .. }
            | Write::Delete { collection, id } => (collection.clone(), id.clone()),
        }
    }
}

/// An ordered group of writes applied atomically
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    guards: Vec<Guard>,
    writes: Vec<Write>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, collection: impl Into<String>, id: impl Into<String>, patch: Patch) -> &mut Self {
        self.writes.push(Write::Create {
            collection: collection.into(),
            id: id.into(),
            patch,
        });
        self
    }

    pub fn set(&mut self, collection: impl Into<String>, id: impl Into<String>, patch: Patch) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.into(),
            id: id.into(),
            patch,
            merge: false,
        });
        self
    }

    pub fn merge(&mut self, collection: impl Into<String>, id: impl Into<String>, patch: Patch) -> &mut Self {
        self.writes.push(Write::Set {
            collection: collection.into(),
            id: id.into(),
            patch,
            merge: true,
        });
        self
    }

    pub fn update(&mut self, collection: impl Into<String>, id: impl Into<String>, patch: Patch) -> &mut Self {
        self.writes.push(Write::Update {
            collection: collection.into(),
            id: id.into(),
            patch,
        });
        self
    }

    pub fn delete(&mut self, collection: impl Into<String>, id: impl Into<String>) -> &mut Self {
        self.writes.push(Write::Delete {
            collection: collection.into(),
            id: id.into(),
        });
        self
    }

    /// Require `field == value` on the stored document at commit time
    pub fn require(
        &mut self,
        collection: impl Into<String>,
        id: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<Value>,
    ) -> &mut Self {
        self.guards.push(Guard {
            collection: collection.into(),
            id: id.into(),
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Every document the batch reads or writes, in lock order
    pub fn touched(&self) -> BTreeSet<DocKey> {
        self.guards
            .iter()
            .map(|g| (g.collection.clone(), g.id.clone()))
            .chain(self.writes.iter().map(Write::key))
            .collect()
    }

    /// Check guards and apply writes to the staged documents
    ///
    /// On error the staging map may be partially modified and must be
    /// discarded.
    pub fn apply(&self, staging: &mut Staging, commit_time: &DateTime<Utc>) -> Result<(), StoreError> {
        for guard in &self.guards {
            let key = (guard.collection.clone(), guard.id.clone());
            let current = staging.get(&key).and_then(Option::as_ref);
            let holds = current.is_some_and(|doc| {
                lookup(doc, &guard.field).is_some_and(|actual| values_equal(actual, &guard.value))
            });
            if !holds {
                return Err(StoreError::PreconditionFailed {
                    collection: guard.collection.clone(),
                    id: guard.id.clone(),
                    field: guard.field.clone(),
                });
            }
        }

        let now = format_timestamp(commit_time);
        for write in &self.writes {
            let key = write.key();
            let slot = staging.entry(key.clone()).or_insert(None);
            match write {
                Write::Create { patch, .. } => {
                    if slot.is_some() {
                        return Err(StoreError::AlreadyExists {
                            collection: key.0,
                            id: key.1,
                        });
                    }
                    let mut doc = Document::new();
                    patch.apply(&mut doc, &now);
                    *slot = Some(doc);
                }
                Write::Set { patch, merge, .. } => {
                    let mut doc = match (*merge, slot.take()) {
                        (true, Some(existing)) => existing,
                        _ => Document::new(),
                    };
                    patch.apply(&mut doc, &now);
                    *slot = Some(doc);
                }
                Write::Update { patch, .. } => match slot.as_mut() {
                    Some(doc) => patch.apply(doc, &now),
                    None => {
                        return Err(StoreError::NotFound {
                            collection: key.0,
                            id: key.1,
                        })
                    }
                },
                Write::Delete { .. } => {
                    *slot = None;
                }
            }
        }
        Ok(())
    }
}
