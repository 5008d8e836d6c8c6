use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use crate::validation::{FieldKind, FieldRule};

/// A conversation between participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Participant identifiers. Not checked against any user store.
    pub members: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Conversation {
    const COLLECTION: &'static str = "conversations";
    const FIELDS: &'static [FieldRule] = &[FieldRule::required("members", FieldKind::StringArray)];
}
