//! Trace store trait: the append-only audit log.
//!
//! Messages flow into a per-conversation log and never leave it. There is no
//! delete or mutate operation anywhere on this trait; the log is the audit
//! contract the rest of the system exists to provide.

use crate::TraceDocument;
use foreman_core::{ConversationId, ForemanResult, Message, MessageId, MessagePayload, MessageRole};

/// Trait for append-only trace storage.
///
/// Implementations must be safe under concurrent writers to the same
/// conversation: `append` is atomic with respect to log order.
pub trait TraceStore: Send + Sync {
    /// Create the log for a conversation.
    ///
    /// # Errors
    ///
    /// `StoreError::ConversationExists` if the log was already opened -
    /// reopening would invite truncation of an audit log.
    fn open(&self, conversation_id: ConversationId) -> ForemanResult<()>;

    /// Append a message to a conversation's log.
    ///
    /// Returns the message id on success.
    ///
    /// # Errors
    ///
    /// `StoreError::ConversationNotFound` if the log was never opened.
    fn append(&self, conversation_id: ConversationId, message: Message)
        -> ForemanResult<MessageId>;

    /// Read the full log in append order.
    ///
    /// Idempotent and side-effect-free.
    ///
    /// # Errors
    ///
    /// `StoreError::ConversationNotFound` if the log was never opened.
    fn read_all(&self, conversation_id: ConversationId) -> ForemanResult<Vec<Message>>;

    /// Number of messages appended so far.
    fn message_count(&self, conversation_id: ConversationId) -> ForemanResult<usize>;
}

/// Extension trait for TraceStore with convenience methods.
///
/// Implementors get these for free by implementing `TraceStore`.
pub trait TraceStoreExt: TraceStore {
    /// Export the log as a structured document for audit printing.
    fn export(&self, conversation_id: ConversationId) -> ForemanResult<TraceDocument> {
        let messages = self.read_all(conversation_id)?;
        Ok(TraceDocument::from_messages(conversation_id, messages))
    }

    /// Id of the most recently appended message, if any.
    fn last_message_id(&self, conversation_id: ConversationId) -> ForemanResult<Option<MessageId>> {
        let messages = self.read_all(conversation_id)?;
        Ok(messages.last().map(|m| m.message_id))
    }

    /// Append a message chained onto the current tail of the log.
    ///
    /// The new message's `parent_id` points at the previous message, giving
    /// each conversation a linked chain for continuity across stages.
    fn append_chained(
        &self,
        conversation_id: ConversationId,
        role: MessageRole,
        payload: MessagePayload,
    ) -> ForemanResult<MessageId> {
        let parent = self.last_message_id(conversation_id)?;
        let mut message = Message::new(conversation_id, role, payload);
        if let Some(parent_id) = parent {
            message = message.with_parent(parent_id);
        }
        self.append(conversation_id, message)
    }
}

// Blanket implementation: any TraceStore automatically gets TraceStoreExt
impl<T: TraceStore + ?Sized> TraceStoreExt for T {}
