//! Thought service: one thought per user.

use serde_json::{Map, Value};
use tracing::{debug, info};

use murmur_core::models::Thought;
use murmur_core::store::{DeleteOutcome, UpdateOutcome};
use murmur_core::{Document, Filter, Listing, Repository, StoreError};

use super::{ServiceError, ServiceResult};

/// The store's unique constraint on `userId` is the only duplicate check, so
/// concurrent requests for one user cannot both succeed.
fn duplicate_as_rule(e: StoreError) -> ServiceError {
    match e {
        StoreError::Duplicate(constraint) => {
            debug!(%constraint, "thought rejected by unique constraint");
            ServiceError::DuplicateThought
        }
        other => other.into(),
    }
}

/// Store a new thought unless the user already has one.
pub async fn create_thought(repo: &Repository<Thought>, thought: Thought) -> ServiceResult<Document> {
    let record = repo.create(&thought).await.map_err(duplicate_as_rule)?;
    info!(id = %record.id, user_id = %thought.user_id, "thought created");
    Ok(record)
}

pub async fn get_all_thoughts(repo: &Repository<Thought>) -> ServiceResult<Listing> {
    Ok(repo.find_all().await?)
}

pub async fn get_single_thought(
    repo: &Repository<Thought>,
    id: &str,
) -> ServiceResult<Option<Document>> {
    Ok(repo.find_by_id(id).await?)
}

/// Apply a validated partial update. Moving `userId` onto a user who already
/// has a thought is a duplicate too.
pub async fn update_thought(
    repo: &Repository<Thought>,
    id: &str,
    patch: Map<String, Value>,
) -> ServiceResult<UpdateOutcome> {
    let outcome = repo.update_one(id, patch).await.map_err(duplicate_as_rule)?;
    if let UpdateOutcome::Matched(summary) = outcome {
        info!(%id, modified = summary.modified_count, "thought updated");
    }
    Ok(outcome)
}

pub async fn delete_thought(repo: &Repository<Thought>, id: &str) -> ServiceResult<DeleteOutcome> {
    let outcome = repo.delete_one(id).await?;
    if matches!(outcome, DeleteOutcome::Deleted(_)) {
        info!(%id, "thought deleted");
    }
    Ok(outcome)
}

pub async fn get_thought_by_user(
    repo: &Repository<Thought>,
    user_id: &str,
) -> ServiceResult<Option<Document>> {
    Ok(repo.find_one(&Filter::eq("userId", user_id)).await?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use murmur_core::SharedStore;
    use murmur_core::store::{MemoryStore, ensure_indexes};
    use serde_json::json;

    use super::*;

    async fn repo() -> Repository<Thought> {
        let store: SharedStore = Arc::new(MemoryStore::new());
        ensure_indexes(store.as_ref()).await.expect("indexes");
        Repository::new(store)
    }

    fn thought(user: &str) -> Thought {
        Thought {
            user_id: user.into(),
            content: "thinking".into(),
            extra: Map::new(),
        }
    }

    #[tokio::test]
    async fn second_thought_for_user_is_a_duplicate() {
        let repo = repo().await;
        create_thought(&repo, thought("u1")).await.expect("first");
        let err = create_thought(&repo, thought("u1")).await.expect_err("second");
        assert!(matches!(err, ServiceError::DuplicateThought));
        assert_eq!(get_all_thoughts(&repo).await.expect("list").total, 1);
    }

    #[tokio::test]
    async fn lookup_by_user_finds_the_thought() {
        let repo = repo().await;
        let created = create_thought(&repo, thought("u1")).await.expect("create");
        let found = get_thought_by_user(&repo, "u1").await.expect("find");
        assert_eq!(found, Some(created));
        assert!(get_thought_by_user(&repo, "u2").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn moving_user_id_onto_a_taken_user_is_a_duplicate() {
        let repo = repo().await;
        create_thought(&repo, thought("u1")).await.expect("create");
        let other = create_thought(&repo, thought("u2")).await.expect("create");

        let mut patch = Map::new();
        patch.insert("userId".into(), json!("u1"));
        let err = update_thought(&repo, &other.id.to_hex(), patch)
            .await
            .expect_err("conflict");
        assert!(matches!(err, ServiceError::DuplicateThought));
    }

    #[tokio::test]
    async fn update_and_delete_pass_outcomes_through() {
        let repo = repo().await;
        assert_eq!(
            update_thought(&repo, "not-an-id", Map::new()).await.expect("update"),
            UpdateOutcome::NotFound
        );
        assert_eq!(
            delete_thought(&repo, "507f1f77bcf86cd799439011").await.expect("delete"),
            DeleteOutcome::NotFound
        );
    }
}
