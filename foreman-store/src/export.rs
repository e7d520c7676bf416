//! Structured trace export for audit printing.

use chrono::Utc;
use foreman_core::{compute_content_hash, ConversationId, Message, Timestamp};
use serde::{Deserialize, Serialize};

/// Exported view of a conversation's trace.
///
/// The checksum covers the serialized message sequence so an auditor can
/// detect a document altered after export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceDocument {
    pub conversation_id: ConversationId,
    pub exported_at: Timestamp,
    pub messages: Vec<Message>,
    /// Hex-encoded SHA-256 of the serialized message sequence
    pub checksum: String,
}

impl TraceDocument {
    /// Build a document from an ordered message sequence.
    pub fn from_messages(conversation_id: ConversationId, messages: Vec<Message>) -> Self {
        let checksum = Self::checksum_of(&messages);
        Self {
            conversation_id,
            exported_at: Utc::now(),
            messages,
            checksum,
        }
    }

    /// Recompute the checksum and compare against the stored one.
    pub fn verify(&self) -> bool {
        Self::checksum_of(&self.messages) == self.checksum
    }

    fn checksum_of(messages: &[Message]) -> String {
        // Message serialization is infallible: payloads are plain data
        let bytes = serde_json::to_vec(messages).unwrap_or_default();
        hex::encode(compute_content_hash(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foreman_core::{MessagePayload, MessageRole};

    fn sample_messages(conversation_id: ConversationId) -> Vec<Message> {
        vec![
            Message::new(
                conversation_id,
                MessageRole::Intake,
                MessagePayload::Intake {
                    goal: "ping service X".to_string(),
                },
            ),
            Message::new(
                conversation_id,
                MessageRole::Planner,
                MessagePayload::Plan { tasks: vec![] },
            ),
        ]
    }

    #[test]
    fn test_export_verifies() {
        let conversation_id = ConversationId::generate();
        let doc = TraceDocument::from_messages(conversation_id, sample_messages(conversation_id));
        assert!(doc.verify());
        assert_eq!(doc.checksum.len(), 64);
    }

    #[test]
    fn test_tampered_export_fails_verification() {
        let conversation_id = ConversationId::generate();
        let mut doc =
            TraceDocument::from_messages(conversation_id, sample_messages(conversation_id));
        doc.messages.pop();
        assert!(!doc.verify());
    }

    #[test]
    fn test_empty_trace_exports() {
        let conversation_id = ConversationId::generate();
        let doc = TraceDocument::from_messages(conversation_id, vec![]);
        assert!(doc.verify());
        assert!(doc.messages.is_empty());
    }
}
