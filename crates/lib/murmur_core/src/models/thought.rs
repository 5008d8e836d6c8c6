use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Entity;
use crate::validation::{FieldKind, FieldRule};

/// A user's shared thought. At most one per `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thought {
    pub user_id: String,
    pub content: String,
    /// Free-form fields, stored as given.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Thought {
    const COLLECTION: &'static str = "thoughts";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("userId", FieldKind::String),
        FieldRule::required("content", FieldKind::String),
    ];
    const UNIQUE: &'static [&'static str] = &["userId"];
}
