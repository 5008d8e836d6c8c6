// Store-assigned document identifiers.
//
// Ids are 12-byte BSON object ids. They travel as 24 lowercase hex chars, so
// they sort roughly by creation time.

pub use bson::oid::ObjectId;

/// Parse a 24-character hex id. Anything else is `None`.
pub fn parse(s: &str) -> Option<ObjectId> {
    ObjectId::parse_str(s).ok()
}

/// Serde adapter that keeps ids as plain hex strings instead of `{"$oid": ..}`.
pub mod hex_string {
    use bson::oid::ObjectId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&id.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ObjectId, D::Error> {
        let hex = String::deserialize(deserializer)?;
        ObjectId::parse_str(&hex).map_err(serde::de::Error::custom)
    }
}
