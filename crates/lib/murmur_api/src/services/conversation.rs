//! Conversation service.

use tracing::info;

use murmur_core::models::Conversation;
use murmur_core::{Document, Filter, Repository};

use super::ServiceResult;

pub async fn create_conversation(
    repo: &Repository<Conversation>,
    conversation: Conversation,
) -> ServiceResult<Document> {
    let record = repo.create(&conversation).await?;
    info!(id = %record.id, members = conversation.members.len(), "conversation created");
    Ok(record)
}

/// Conversations the given participant is a member of, oldest first.
pub async fn get_user_conversations(
    repo: &Repository<Conversation>,
    member_id: &str,
) -> ServiceResult<Vec<Document>> {
    Ok(repo.find_many(&Filter::eq("members", member_id)).await?)
}
