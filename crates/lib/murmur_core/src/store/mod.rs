//! Document storage.
//!
//! A store holds named collections of JSON object documents. Each document
//! carries a store-assigned [`ObjectId`] and creation/update timestamps next
//! to its body. Two backends exist: [`PgDocumentStore`] (JSONB rows in
//! PostgreSQL) and [`MemoryStore`].

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

use crate::models::{UniqueKey, unique_keys};
use crate::object_id::ObjectId;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt document {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("Invalid schema: {0}")]
    Schema(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Handle shared by every request for the lifetime of the process.
pub type SharedStore = Arc<dyn DocumentStore>;

/// A stored record.
///
/// Serializes flat: `{"_id": ..., <body fields>, "createdAt": ..., "updatedAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id", with = "crate::object_id::hex_string")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub body: Map<String, Value>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }
}

/// Conjunction of exact-match field predicates.
///
/// A predicate on an array field also matches when the array contains the
/// value, so `Filter::eq("members", "u1")` finds every document whose
/// `members` list includes `"u1"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn matches(&self, body: &Map<String, Value>) -> bool {
        self.clauses.iter().all(|(field, expected)| match body.get(field) {
            Some(actual) if actual == expected => true,
            Some(Value::Array(items)) => items.contains(expected),
            _ => false,
        })
    }
}

/// Counts reported by a successful update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateSummary {
    pub fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
        }
    }
}

/// Result of an update keyed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No document with that id (or the id was malformed).
    NotFound,
    Matched(UpdateSummary),
}

/// Counts reported by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteSummary {
    pub fn deleted() -> Self {
        Self {
            acknowledged: true,
            deleted_count: 1,
        }
    }
}

/// Result of a delete keyed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotFound,
    Deleted(DeleteSummary),
}

/// Which backend a store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Postgres => "postgres",
            StoreKind::Memory => "memory",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown store kind {0:?} (expected `postgres` or `memory`)")]
pub struct UnknownStoreKind(String);

impl FromStr for StoreKind {
    type Err = UnknownStoreKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "mem" => Ok(StoreKind::Memory),
            _ => Err(UnknownStoreKind(s.to_string())),
        }
    }
}

/// A collection-oriented document store.
///
/// Every method is one store round trip. `update_one` and `delete_one` are
/// atomic: they locate and mutate in the same operation.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Create the unique constraint if it does not exist yet.
    async fn ensure_unique(&self, key: UniqueKey) -> Result<()>;

    /// Insert a new document. `body` must not contain store-managed keys.
    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document>;

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>>;

    /// Matching documents in insertion order, at most `limit` of them.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>>;

    /// Merge `patch` into the top-level fields of one document.
    async fn update_one(
        &self,
        collection: &str,
        id: &ObjectId,
        patch: Map<String, Value>,
    ) -> Result<UpdateOutcome>;

    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()>;

    /// Release backend resources. Called once on shutdown.
    async fn close(&self) {}
}

/// Create every unique constraint declared by the entity schemas.
pub async fn ensure_indexes(store: &dyn DocumentStore) -> Result<()> {
    for key in unique_keys() {
        store.ensure_unique(key).await?;
        info!(
            collection = key.collection,
            field = key.field,
            store = %store.kind(),
            "unique constraint ensured"
        );
    }
    Ok(())
}

/// Store timestamps keep millisecond precision.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn filter_matches_scalars_exactly() {
        let doc = body(json!({"userId": "u1", "content": "x"}));
        assert!(Filter::eq("userId", "u1").matches(&doc));
        assert!(!Filter::eq("userId", "u2").matches(&doc));
        assert!(!Filter::eq("missing", "u1").matches(&doc));
        assert!(Filter::all().matches(&doc));
    }

    #[test]
    fn filter_matches_array_membership() {
        let doc = body(json!({"members": ["a", "b"]}));
        assert!(Filter::eq("members", "a").matches(&doc));
        assert!(Filter::eq("members", json!(["a", "b"])).matches(&doc));
        assert!(!Filter::eq("members", "c").matches(&doc));
    }

    #[test]
    fn filter_clauses_are_conjunctive() {
        let doc = body(json!({"a": 1, "b": 2}));
        assert!(Filter::eq("a", 1).and("b", 2).matches(&doc));
        assert!(!Filter::eq("a", 1).and("b", 3).matches(&doc));
    }

    #[test]
    fn document_serializes_flat() {
        let id = ObjectId::parse_str("507f1f77bcf86cd799439011").expect("id");
        let ts = DateTime::parse_from_rfc3339("2026-10-19T08:00:00.000Z")
            .expect("ts")
            .with_timezone(&Utc);
        let doc = Document {
            id,
            body: body(json!({"userId": "u1"})),
            created_at: ts,
            updated_at: ts,
        };
        let json = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(json["_id"], "507f1f77bcf86cd799439011");
        assert_eq!(json["userId"], "u1");
        assert!(json["createdAt"].is_string());
        assert!(json.get("body").is_none());
    }

    #[test]
    fn summaries_use_camel_case_counts() {
        let update = serde_json::to_value(UpdateSummary::matched(false)).expect("serialize");
        assert_eq!(
            update,
            json!({"acknowledged": true, "matchedCount": 1, "modifiedCount": 0})
        );
        let delete = serde_json::to_value(DeleteSummary::deleted()).expect("serialize");
        assert_eq!(delete, json!({"acknowledged": true, "deletedCount": 1}));
    }

    #[test]
    fn store_kind_parses_aliases() {
        assert_eq!("Postgres".parse::<StoreKind>().ok(), Some(StoreKind::Postgres));
        assert_eq!("mem".parse::<StoreKind>().ok(), Some(StoreKind::Memory));
        assert!("redis".parse::<StoreKind>().is_err());
    }
}
