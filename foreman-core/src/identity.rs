//! Identity types for FOREMAN entities

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// SHA-256 content hash for trace export integrity verification.
pub type ContentHash = [u8; 32];

/// Generate a new UUIDv7 identifier (timestamp-sortable).
/// UUIDv7 embeds a Unix timestamp, making IDs naturally sortable by creation
/// time, so conversation and message ordering needs no separate sequence
/// counter.
pub fn new_entity_id() -> Uuid {
    Uuid::now_v7()
}

/// Compute SHA-256 hash of content.
pub fn compute_content_hash(content: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Wrap an existing UUID.
            pub fn new(id: Uuid) -> Self {
                Self(id)
            }

            /// Generate a fresh UUIDv7 identifier.
            pub fn generate() -> Self {
                Self(new_entity_id())
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a conversation (top-level lifecycle container).
    ConversationId
);
entity_id!(
    /// Identifier of a message in a conversation trace.
    MessageId
);
entity_id!(
    /// Identifier of a task materialized from a plan.
    TaskId
);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity_id_is_v7() {
        let id = new_entity_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_entity_ids_are_sortable() {
        let id1 = new_entity_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = new_entity_id();
        // UUIDv7 should be lexicographically sortable by time
        assert!(id1.to_string() < id2.to_string());
    }

    #[test]
    fn test_content_hash() {
        let content = b"hello world";
        let hash = compute_content_hash(content);
        assert_eq!(hash.len(), 32);
        // Same content should produce same hash
        let hash2 = compute_content_hash(content);
        assert_eq!(hash, hash2);
    }

    #[test]
    fn test_typed_id_roundtrip() {
        let id = ConversationId::generate();
        let parsed: ConversationId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_typed_id_serde_transparent() {
        let id = TaskId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: TaskId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any two identifiers generated in sequence, the first SHALL
        /// sort before the second lexicographically.
        #[test]
        fn prop_entity_ids_are_timestamp_sortable(_iteration in 0..100u32) {
            let id1 = new_entity_id();
            // Small delay to ensure different timestamps
            std::thread::sleep(std::time::Duration::from_millis(1));
            let id2 = new_entity_id();

            prop_assert!(id1.to_string() < id2.to_string(),
                "id1 ({}) should sort before id2 ({})", id1, id2);
        }

        /// All generated identifiers SHALL be UUIDv7.
        #[test]
        fn prop_entity_ids_are_v7(_iteration in 0..100u32) {
            let id = new_entity_id();
            prop_assert_eq!(id.get_version_num(), 7,
                "id {} should be version 7, got version {}", id, id.get_version_num());
        }
    }
}
