//! Typed access to one entity's collection.
//!
//! Each method is exactly one store operation. Malformed ids are not errors:
//! they behave like ids that match nothing, and never reach the store.

use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::models::Entity;
use crate::object_id;
use crate::store::{
    DeleteOutcome, Document, Filter, Result, SharedStore, StoreError, UpdateOutcome,
};
use crate::validation::RESERVED_KEYS;

/// Every record of a collection plus its size, taken from one read.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub records: Vec<Document>,
    pub total: usize,
}

/// Repository over the collection of entity `E`.
pub struct Repository<E> {
    store: SharedStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Insert one record built from a validated payload.
    pub async fn create(&self, payload: &E) -> Result<Document> {
        let Value::Object(mut body) = serde_json::to_value(payload)? else {
            return Err(StoreError::Schema(format!(
                "{} payload does not serialize to an object",
                E::COLLECTION
            )));
        };
        strip_reserved(&mut body);
        self.store.insert(E::COLLECTION, body).await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Document>> {
        let Some(id) = object_id::parse(id) else {
            return Ok(None);
        };
        self.store.find_by_id(E::COLLECTION, &id).await
    }

    /// First matching record in insertion order.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Document>> {
        let mut docs = self.store.find(E::COLLECTION, filter, Some(1)).await?;
        Ok(docs.pop())
    }

    pub async fn find_many(&self, filter: &Filter) -> Result<Vec<Document>> {
        self.store.find(E::COLLECTION, filter, None).await
    }

    pub async fn find_all(&self) -> Result<Listing> {
        let records = self.store.find(E::COLLECTION, &Filter::all(), None).await?;
        Ok(Listing {
            total: records.len(),
            records,
        })
    }

    /// Overwrite only the fields named in `patch`.
    pub async fn update_one(&self, id: &str, mut patch: Map<String, Value>) -> Result<UpdateOutcome> {
        let Some(id) = object_id::parse(id) else {
            return Ok(UpdateOutcome::NotFound);
        };
        strip_reserved(&mut patch);
        self.store.update_one(E::COLLECTION, &id, patch).await
    }

    pub async fn delete_one(&self, id: &str) -> Result<DeleteOutcome> {
        let Some(id) = object_id::parse(id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        self.store.delete_one(E::COLLECTION, &id).await
    }
}

fn strip_reserved(body: &mut Map<String, Value>) {
    for key in RESERVED_KEYS {
        body.remove(*key);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{Conversation, Message, Thought};
    use crate::store::{MemoryStore, UpdateSummary, ensure_indexes};
    use serde_json::json;

    async fn store() -> SharedStore {
        let store: SharedStore = Arc::new(MemoryStore::new());
        ensure_indexes(store.as_ref()).await.expect("indexes");
        store
    }

    fn thought(user: &str, content: &str) -> Thought {
        Thought {
            user_id: user.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id_round_trips() {
        let repo = Repository::<Thought>::new(store().await);
        let created = repo.create(&thought("u1", "hello")).await.expect("create");
        let fetched = repo
            .find_by_id(&created.id.to_hex())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(fetched, created);
        assert_eq!(fetched.get("userId"), Some(&json!("u1")));
    }

    #[tokio::test]
    async fn malformed_ids_match_nothing() {
        let repo = Repository::<Thought>::new(store().await);
        repo.create(&thought("u1", "hello")).await.expect("create");

        assert!(repo.find_by_id("not-an-id").await.expect("find").is_none());
        assert_eq!(
            repo.update_one("not-an-id", Map::new()).await.expect("update"),
            UpdateOutcome::NotFound
        );
        assert_eq!(
            repo.delete_one("not-an-id").await.expect("delete"),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn update_leaves_unnamed_fields_untouched() {
        let repo = Repository::<Thought>::new(store().await);
        let mut payload = thought("u1", "before");
        payload.extra.insert("mood".into(), json!("calm"));
        let created = repo.create(&payload).await.expect("create");

        let mut patch = Map::new();
        patch.insert("content".into(), json!("x"));
        patch.insert("_id".into(), json!("ffffffffffffffffffffffff"));
        let outcome = repo
            .update_one(&created.id.to_hex(), patch)
            .await
            .expect("update");
        assert_eq!(outcome, UpdateOutcome::Matched(UpdateSummary::matched(true)));

        let after = repo
            .find_by_id(&created.id.to_hex())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(after.id, created.id);
        assert_eq!(after.get("content"), Some(&json!("x")));
        assert_eq!(after.get("userId"), Some(&json!("u1")));
        assert_eq!(after.get("mood"), Some(&json!("calm")));
        assert_eq!(after.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let repo = Repository::<Thought>::new(store().await);
        let created = repo.create(&thought("u1", "bye")).await.expect("create");
        let id = created.id.to_hex();
        assert!(matches!(
            repo.delete_one(&id).await.expect("delete"),
            DeleteOutcome::Deleted(summary) if summary.deleted_count == 1
        ));
        assert!(repo.find_by_id(&id).await.expect("find").is_none());
        assert_eq!(repo.delete_one(&id).await.expect("delete"), DeleteOutcome::NotFound);
    }

    #[tokio::test]
    async fn find_all_total_matches_records() {
        let repo = Repository::<Thought>::new(store().await);
        for user in ["u1", "u2", "u3"] {
            repo.create(&thought(user, "hi")).await.expect("create");
        }
        let listing = repo.find_all().await.expect("list");
        assert_eq!(listing.total, 3);
        assert_eq!(listing.total, listing.records.len());
    }

    #[tokio::test]
    async fn concurrent_creates_for_one_user_store_a_single_thought() {
        let repo = Repository::<Thought>::new(store().await);
        let attempts = (0..16).map(|n| {
            let repo = repo.clone();
            async move { repo.create(&thought("same-user", &format!("take {n}"))).await }
        });
        let results = futures::future::join_all(attempts).await;

        let ok = results.iter().filter(|r| r.is_ok()).count();
        let dup = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::Duplicate(_))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(dup, 15);
        assert_eq!(
            repo.find_many(&Filter::eq("userId", "same-user"))
                .await
                .expect("find")
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn entity_types_keep_their_own_collections() {
        let store = store().await;
        let messages = Repository::<Message>::new(store.clone());
        let conversations = Repository::<Conversation>::new(store);

        messages
            .create(&Message {
                conversation_id: "c1".into(),
                sender_id: "u1".into(),
                message: "hey".into(),
            })
            .await
            .expect("create message");
        conversations
            .create(&Conversation {
                members: vec!["u1".into(), "u2".into()],
                extra: Map::new(),
            })
            .await
            .expect("create conversation");

        assert_eq!(messages.find_all().await.expect("list").total, 1);
        let mine = conversations
            .find_one(&Filter::eq("members", "u2"))
            .await
            .expect("find");
        assert!(mine.is_some());
        assert!(
            conversations
                .find_one(&Filter::eq("members", "u9"))
                .await
                .expect("find")
                .is_none()
        );
    }
}
