//! In-process document store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    DeleteOutcome, DeleteSummary, Document, DocumentStore, Filter, Result, StoreError, StoreKind,
    UpdateOutcome, UpdateSummary, now,
};
use crate::models::UniqueKey;
use crate::object_id::ObjectId;

#[derive(Debug, Default)]
struct Inner {
    /// Documents per collection, in insertion order.
    collections: HashMap<String, Vec<Document>>,
    unique: Vec<UniqueKey>,
}

impl Inner {
    /// Name of the first unique constraint `body` would violate, ignoring the
    /// document with id `skip`.
    fn conflict(
        &self,
        collection: &str,
        body: &Map<String, Value>,
        skip: Option<&ObjectId>,
    ) -> Option<String> {
        let docs = self.collections.get(collection)?;
        self.unique
            .iter()
            .filter(|key| key.collection == collection)
            .find(|key| {
                let Some(value) = body.get(key.field).filter(|v| !v.is_null()) else {
                    return false;
                };
                docs.iter()
                    .filter(|doc| Some(&doc.id) != skip)
                    .any(|doc| doc.body.get(key.field) == Some(value))
            })
            .map(UniqueKey::index_name)
    }
}

/// A [`DocumentStore`] kept entirely in memory.
///
/// Every operation takes one lock, so unique checks and the write that
/// follows them cannot interleave with other writers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn ensure_unique(&self, key: UniqueKey) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.unique.contains(&key) {
            inner.unique.push(key);
        }
        Ok(())
    }

    async fn insert(&self, collection: &str, body: Map<String, Value>) -> Result<Document> {
        let mut inner = self.inner.write().await;
        if let Some(constraint) = inner.conflict(collection, &body, None) {
            return Err(StoreError::Duplicate(constraint));
        }

        let ts = now();
        let doc = Document {
            id: ObjectId::new(),
            body,
            created_at: ts,
            updated_at: ts,
        };
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(doc.clone());
        debug!(collection, id = %doc.id, "inserted document");
        Ok(doc)
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        let inner = self.inner.read().await;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| &doc.id == id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> Result<Vec<Document>> {
        let inner = self.inner.read().await;
        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|doc| filter.matches(&doc.body))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn update_one(
        &self,
        collection: &str,
        id: &ObjectId,
        patch: Map<String, Value>,
    ) -> Result<UpdateOutcome> {
        let mut inner = self.inner.write().await;
        let Some(current) = inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| &doc.id == id))
        else {
            return Ok(UpdateOutcome::NotFound);
        };

        let mut merged = current.body.clone();
        merged.extend(patch);
        let modified = merged != current.body;

        if modified && let Some(constraint) = inner.conflict(collection, &merged, Some(id)) {
            return Err(StoreError::Duplicate(constraint));
        }

        if modified
            && let Some(doc) = inner
                .collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|doc| &doc.id == id))
        {
            doc.body = merged;
            doc.updated_at = now();
        }
        debug!(collection, %id, modified, "updated document");
        Ok(UpdateOutcome::Matched(UpdateSummary::matched(modified)))
    }

    async fn delete_one(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome> {
        let mut inner = self.inner.write().await;
        let Some(docs) = inner.collections.get_mut(collection) else {
            return Ok(DeleteOutcome::NotFound);
        };
        let Some(pos) = docs.iter().position(|doc| &doc.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        docs.remove(pos);
        debug!(collection, %id, "deleted document");
        Ok(DeleteOutcome::Deleted(DeleteSummary::deleted()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
