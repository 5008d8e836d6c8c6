//! PostgreSQL-backed document store.
//!
//! All collections share the `documents` table; bodies live in a JSONB
//! column. Unique constraints are partial expression indexes on
//! `body ->> field` scoped to one collection.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use super::{
    DeleteOutcome, DeleteSummary, Document, DocumentStore, Filter, Result, StoreError, StoreKind,
    UpdateOutcome, UpdateSummary, now,
};
use crate::models::UniqueKey;
use crate::object_id::ObjectId;

const SELECT_COLUMNS: &str = "SELECT id, body, created_at, updated_at FROM documents";

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    body: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        let id = ObjectId::parse_str(&row.id).map_err(|_| StoreError::Corrupt {
            id: row.id.clone(),
            reason: "id is not a 24-character hex object id".into(),
        })?;
        let Value::Object(body) = row.body else {
            return Err(StoreError::Corrupt {
                id: row.id,
                reason: "body is not a JSON object".into(),
            });
        };
        Ok(Document {
            id,
            body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Turn unique violations into [`StoreError::Duplicate`].
fn map_sql(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return StoreError::Duplicate(db.constraint().unwrap_or("unique").to_string());
    }
    StoreError::Sql(e)
}

fn single_field(field: &str, value: Value) -> Value {
    let mut object = Map::new();
    object.insert(field.to_string(), value);
    Value::Object(object)
}

fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A [`DocumentStore`] over a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool. Migrations are not run here.
    pub async fn connect(
        url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    async fn ensure_unique(&self, key: UniqueKey) -> Result<()> {
        if !is_plain_identifier(key.collection) || !is_plain_identifier(key.field) {
            return Err(StoreError::Schema(format!(
                "unique key {}.{} must be a plain identifier",
                key.collection, key.field
            )));
        }
        let sql = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS {index} ON documents ((body ->> '{field}')) \
             WHERE collection = '{collection}'",
            index = key.index_name(),
            field = key.field,
            collection = key.collection,
        );
        sqlx::query(&sql).execute(&self.pool).await.map_err(map_sql)?;
        Ok(())
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (id, collection, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(ObjectId::new().to_hex())
        .bind(collection)
        .bind(Value::Object(body))
        .bind(now())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sql)?;

        let doc = Document::try_from(row)?;
        debug!(collection, id = %doc.id, "inserted document");
        Ok(doc)
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!(
            "{SELECT_COLUMNS} WHERE collection = $1 AND id = $2"
        ))
        .bind(collection)
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Document::try_from).transpose()
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_COLUMNS);
        qb.push(" WHERE collection = ").push_bind(collection.to_string());

        // `{f: v}` matches equal scalars; `{f: [v]}` matches arrays holding v.
        for (field, value) in filter.clauses() {
            qb.push(" AND (body @> ")
                .push_bind(single_field(field, value.clone()))
                .push(" OR body @> ")
                .push_bind(single_field(field, Value::Array(vec![value.clone()])))
                .push(")");
        }

        qb.push(" ORDER BY created_at, id");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Document::try_from).collect()
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &ObjectId,
        patch: Map<String, Value>,
    ) -> Result<UpdateOutcome> {
        let modified = sqlx::query_scalar::<_, bool>(
            r#"
            WITH prev AS (
                SELECT body FROM documents
                WHERE collection = $1 AND id = $2
                FOR UPDATE
            )
            UPDATE documents AS d
            SET body = d.body || $3,
                updated_at = CASE WHEN d.body || $3 = d.body THEN d.updated_at ELSE $4 END
            FROM prev
            WHERE d.collection = $1 AND d.id = $2
            RETURNING d.body IS DISTINCT FROM prev.body
            "#,
        )
        .bind(collection)
        .bind(id.to_hex())
        .bind(Value::Object(patch))
        .bind(now())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sql)?;

        Ok(match modified {
            None => UpdateOutcome::NotFound,
            Some(modified) => {
                debug!(collection, %id, modified, "updated document");
                UpdateOutcome::Matched(UpdateSummary::matched(modified))
            }
        })
    }

    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(DeleteOutcome::NotFound);
        }
        debug!(collection, %id, "deleted document");
        Ok(DeleteOutcome::Deleted(DeleteSummary::deleted()))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        info!("closing postgres pool");
        self.pool.close().await;
    }
}
