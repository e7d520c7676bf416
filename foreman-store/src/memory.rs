//! In-memory TraceStore implementation.
//!
//! Stores logs in a HashMap protected by an RwLock. Suitable for a
//! single-process deployment and for tests; a persistent backend plugs in
//! behind the same trait.

use crate::TraceStore;
use foreman_core::{ConversationId, ForemanResult, Message, MessageId, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory TraceStore.
///
/// `Clone` shares the underlying storage, so handles can be passed to the
/// dispatcher and the control surface while writing to the same logs.
pub struct InMemoryTraceStore {
    logs: Arc<RwLock<HashMap<ConversationId, Vec<Message>>>>,
}

impl InMemoryTraceStore {
    /// Create a new empty trace store.
    pub fn new() -> Self {
        Self {
            logs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of conversations with an open log.
    pub fn conversation_count(&self) -> ForemanResult<usize> {
        let logs = self.logs.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(logs.len())
    }
}

impl Default for InMemoryTraceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for InMemoryTraceStore {
    fn clone(&self) -> Self {
        Self {
            logs: Arc::clone(&self.logs),
        }
    }
}

impl TraceStore for InMemoryTraceStore {
    fn open(&self, conversation_id: ConversationId) -> ForemanResult<()> {
        let mut logs = self.logs.write().map_err(|_| StoreError::LockPoisoned)?;
        if logs.contains_key(&conversation_id) {
            return Err(StoreError::ConversationExists {
                id: conversation_id,
            }
            .into());
        }
        logs.insert(conversation_id, Vec::new());
        Ok(())
    }

    fn append(
        &self,
        conversation_id: ConversationId,
        message: Message,
    ) -> ForemanResult<MessageId> {
        let mut logs = self.logs.write().map_err(|_| StoreError::LockPoisoned)?;
        let log = logs
            .get_mut(&conversation_id)
            .ok_or(StoreError::ConversationNotFound {
                id: conversation_id,
            })?;
        let id = message.message_id;
        log.push(message);
        Ok(id)
    }

    fn read_all(&self, conversation_id: ConversationId) -> ForemanResult<Vec<Message>> {
        let logs = self.logs.read().map_err(|_| StoreError::LockPoisoned)?;
        let log = logs
            .get(&conversation_id)
            .ok_or(StoreError::ConversationNotFound {
                id: conversation_id,
            })?;
        Ok(log.clone())
    }

    fn message_count(&self, conversation_id: ConversationId) -> ForemanResult<usize> {
        let logs = self.logs.read().map_err(|_| StoreError::LockPoisoned)?;
        let log = logs
            .get(&conversation_id)
            .ok_or(StoreError::ConversationNotFound {
                id: conversation_id,
            })?;
        Ok(log.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TraceStoreExt;
    use foreman_core::{ForemanError, MessagePayload, MessageRole};

    fn msg(conversation_id: ConversationId) -> Message {
        Message::new(
            conversation_id,
            MessageRole::System,
            MessagePayload::Intake {
                goal: "g".to_string(),
            },
        )
    }

    #[test]
    fn test_append_requires_open() {
        let store = InMemoryTraceStore::new();
        let id = ConversationId::generate();
        let result = store.append(id, msg(id));
        assert!(matches!(
            result,
            Err(ForemanError::Store(StoreError::ConversationNotFound { .. }))
        ));
    }

    #[test]
    fn test_reopen_rejected() {
        let store = InMemoryTraceStore::new();
        let id = ConversationId::generate();
        store.open(id).unwrap();
        let result = store.open(id);
        assert!(matches!(
            result,
            Err(ForemanError::Store(StoreError::ConversationExists { .. }))
        ));
    }

    #[test]
    fn test_read_all_preserves_append_order() {
        let store = InMemoryTraceStore::new();
        let id = ConversationId::generate();
        store.open(id).unwrap();

        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(store.append(id, msg(id)).unwrap());
        }

        let read: Vec<_> = store
            .read_all(id)
            .unwrap()
            .into_iter()
            .map(|m| m.message_id)
            .collect();
        assert_eq!(read, ids);
    }

    #[test]
    fn test_clone_shares_storage() {
        let store = InMemoryTraceStore::new();
        let handle = store.clone();
        let id = ConversationId::generate();
        store.open(id).unwrap();
        handle.append(id, msg(id)).unwrap();
        assert_eq!(store.message_count(id).unwrap(), 1);
    }

    #[test]
    fn test_export_roundtrip() {
        let store = InMemoryTraceStore::new();
        let id = ConversationId::generate();
        store.open(id).unwrap();
        store.append(id, msg(id)).unwrap();

        let doc = store.export(id).unwrap();
        assert_eq!(doc.conversation_id, id);
        assert_eq!(doc.messages.len(), 1);
        assert!(doc.verify());
    }

    #[test]
    fn test_concurrent_appends_all_land() {
        let store = InMemoryTraceStore::new();
        let id = ConversationId::generate();
        store.open(id).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.append(id, msg(id)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.message_count(id).unwrap(), 200);
    }
}

// ============================================================================
// PROPERTY-BASED TESTS
// ============================================================================

#[cfg(test)]
mod prop_tests {
    use super::*;
    use foreman_core::{MessagePayload, MessageRole};
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// The log never shrinks and stays ordered by append time.
        #[test]
        fn prop_trace_is_append_only(batches in prop::collection::vec(1usize..5, 1..10)) {
            let store = InMemoryTraceStore::new();
            let id = ConversationId::generate();
            store.open(id).unwrap();

            let mut seen = 0usize;
            for batch in batches {
                for _ in 0..batch {
                    let message = Message::new(
                        id,
                        MessageRole::Executor,
                        MessagePayload::Intake { goal: "g".to_string() },
                    );
                    store.append(id, message).unwrap();
                }
                seen += batch;
                let messages = store.read_all(id).unwrap();
                prop_assert_eq!(messages.len(), seen);
                for window in messages.windows(2) {
                    prop_assert!(window[0].created_at <= window[1].created_at);
                }
            }
        }
    }
}
