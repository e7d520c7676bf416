//! FOREMAN Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

mod config;
mod entities;
mod enums;
mod error;
mod identity;

pub use config::{ApprovalPolicy, Backoff, EngineConfig, RetryPolicy};
pub use entities::{
    Conversation, ConversationOutcome, ConversationSnapshot, Message, MessagePayload, Task,
    TaskSpec,
};
pub use enums::{ConversationStatus, Decision, MessageRole, OutcomeStatus, TaskStatus};
pub use error::{
    CapabilityFailure, ConfigError, DispatchError, ForemanError, ForemanResult, PlanError,
    ProviderError, RegistryError, StoreError,
};
pub use identity::{
    compute_content_hash, new_entity_id, ContentHash, ConversationId, MessageId, TaskId, Timestamp,
};
