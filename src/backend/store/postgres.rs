/**
 * PostgreSQL Document Store
 *
 * Stores documents as JSONB rows in the `documents` table created by the
 * migrations in `migrations/`. Queries are translated to JSONB path
 * expressions with bound parameters; batches run in one transaction that
 * locks every touched row (`SELECT ... FOR UPDATE`, in key order) before the
 * shared staging logic evaluates guards and writes.
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::batch::Staging;
use super::query::{Direction, Filter};
use super::{Document, DocumentStore, Query, Snapshot, StoreError, WriteBatch};

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn field_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}

fn into_document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// Append `AND <predicate>` for every filter
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &Query) {
    for filter in &query.filters {
        let path = field_path(filter.field_path());
        builder.push(" AND ");
        match filter {
            Filter::Equal(_, value) => {
                builder.push("data #> ").push_bind(path).push(" = ").push_bind(value.clone());
            }
            Filter::NotEqual(_, value) => {
                builder
                    .push("(data #> ")
                    .push_bind(path.clone())
                    .push(") IS NOT NULL AND data #> ")
                    .push_bind(path)
                    .push(" <> ")
                    .push_bind(value.clone());
            }
            Filter::LessThan(_, value)
            | Filter::LessThanOrEqual(_, value)
            | Filter::GreaterThan(_, value)
            | Filter::GreaterThanOrEqual(_, value) => {
                let op = match filter {
                    Filter::LessThan(..) => " < ",
                    Filter::LessThanOrEqual(..) => " <= ",
                    Filter::GreaterThan(..) => " > ",
                    _ => " >= ",
                };
                builder
                    .push("jsonb_typeof(data #> ")
                    .push_bind(path.clone())
                    .push(") = jsonb_typeof(")
                    .push_bind(value.clone())
                    .push(") AND data #> ")
                    .push_bind(path)
                    .push(op)
                    .push_bind(value.clone());
            }
            Filter::In(_, values) => {
                builder
                    .push("(data #> ")
                    .push_bind(path.clone())
                    .push(") IS NOT NULL AND ")
                    .push_bind(Value::Array(values.clone()))
                    .push(" @> jsonb_build_array(data #> ")
                    .push_bind(path)
                    .push(")");
            }
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Snapshot>, StoreError> {
        let row = sqlx::query("SELECT data FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(Snapshot {
                id: id.to_string(),
                data: into_document(row.try_get("data")?),
            })),
            None => Ok(None),
        }
    }

    async fn query(&self, query: &Query) -> Result<Vec<Snapshot>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id, data FROM documents WHERE collection = ");
        builder.push_bind(query.collection.clone());
        push_filters(&mut builder, query);

        for order in &query.order_by {
            builder
                .push(" AND (data #> ")
                .push_bind(field_path(&order.field))
                .push(") IS NOT NULL");
        }

        builder.push(" ORDER BY ");
        for order in &query.order_by {
            builder
                .push("data #> ")
                .push_bind(field_path(&order.field))
                .push(match order.direction {
                    Direction::Ascending => " ASC, ",
                    Direction::Descending => " DESC, ",
                });
        }
        builder.push("id ASC");

        if let Some(limit) = query.limit {
            builder
                .push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if query.offset > 0 {
            builder
                .push(" OFFSET ")
                .push_bind(i64::try_from(query.offset).unwrap_or(i64::MAX));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(Snapshot {
                    id: row.try_get("id")?,
                    data: into_document(row.try_get("data")?),
                })
            })
            .collect()
    }

    async fn count(&self, query: &Query) -> Result<usize, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT count(*) AS n FROM documents WHERE collection = ");
        builder.push_bind(query.collection.clone());
        push_filters(&mut builder, query);

        let row = builder.build().fetch_one(&self.pool).await?;
        let n: i64 = row.try_get("n")?;
        Ok(n.max(0) as usize)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<DateTime<Utc>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut original: Staging = Staging::new();
        for (collection, id) in batch.touched() {
            let row = sqlx::query(
                "SELECT data FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
            )
            .bind(&collection)
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await?;
            let current = match row {
                Some(row) => Some(into_document(row.try_get("data")?)),
                None => None,
            };
            original.insert((collection, id), current);
        }

        let commit_time = Utc::now();
        let mut staging = original.clone();
        // Dropping the transaction on error rolls it back.
        batch.apply(&mut staging, &commit_time)?;

        for (key, doc) in staging {
            if original.get(&key) == Some(&doc) {
                continue;
            }
            let (collection, id) = key;
            match doc {
                Some(doc) => {
                    sqlx::query(
                        r#"
                        INSERT INTO documents (collection, id, data)
                        VALUES ($1, $2, $3)
                        ON CONFLICT (collection, id) DO UPDATE SET data = EXCLUDED.data
                        "#,
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(Value::Object(doc))
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                        .bind(&collection)
                        .bind(&id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(commit_time)
    }
}
