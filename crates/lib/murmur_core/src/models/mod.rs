//! Entity schemas.
//!
//! Each entity declares the collection it lives in, its field contract, and
//! the fields the store must keep unique.

mod conversation;
mod message;
mod thought;

pub use conversation::Conversation;
pub use message::Message;
pub use thought::Thought;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::validation::FieldRule;

/// A persisted record kind.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name in the document store.
    const COLLECTION: &'static str;

    /// Declared fields checked by the validator.
    const FIELDS: &'static [FieldRule];

    /// Top-level fields whose values must be unique within the collection.
    const UNIQUE: &'static [&'static str] = &[];
}

/// A `(collection, field)` pair the store has to keep unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueKey {
    pub collection: &'static str,
    pub field: &'static str,
}

impl UniqueKey {
    /// Constraint name reported when the key is violated.
    pub fn index_name(&self) -> String {
        format!("documents_{}_{}_key", self.collection, self.field).to_ascii_lowercase()
    }
}

fn unique_keys_of<E: Entity>() -> impl Iterator<Item = UniqueKey> {
    E::UNIQUE.iter().map(|field| UniqueKey {
        collection: E::COLLECTION,
        field: *field,
    })
}

/// Every unique constraint declared by the known entities.
pub fn unique_keys() -> Vec<UniqueKey> {
    unique_keys_of::<Message>()
        .chain(unique_keys_of::<Conversation>())
        .chain(unique_keys_of::<Thought>())
        .collect()
}
