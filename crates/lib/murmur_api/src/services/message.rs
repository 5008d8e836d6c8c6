//! Chat message service. Messages are stored only; nothing is delivered.

use tracing::debug;

use murmur_core::models::Message;
use murmur_core::{Document, Filter, Repository};

use super::ServiceResult;

pub async fn create_message(repo: &Repository<Message>, message: Message) -> ServiceResult<Document> {
    let record = repo.create(&message).await?;
    debug!(
        id = %record.id,
        conversation_id = %message.conversation_id,
        sender_id = %message.sender_id,
        "message stored"
    );
    Ok(record)
}

/// Messages of one conversation in the order they were stored.
pub async fn get_conversation_messages(
    repo: &Repository<Message>,
    conversation_id: &str,
) -> ServiceResult<Vec<Document>> {
    Ok(repo
        .find_many(&Filter::eq("conversationId", conversation_id))
        .await?)
}
