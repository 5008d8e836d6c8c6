use serde::{Deserialize, Serialize};

use super::Entity;
use crate::validation::{FieldKind, FieldRule};

/// A chat message. Fields outside the schema are dropped on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub conversation_id: String,
    pub sender_id: String,
    pub message: String,
}

impl Entity for Message {
    const COLLECTION: &'static str = "messages";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("conversationId", FieldKind::String),
        FieldRule::required("senderId", FieldKind::String),
        FieldRule::required("message", FieldKind::String),
    ];
}
