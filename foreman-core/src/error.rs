//! Error types for FOREMAN operations

use crate::{ConversationId, TaskId, TaskStatus};
use thiserror::Error;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: ConversationId },

    #[error("Task not found: {id}")]
    TaskNotFound { id: TaskId },

    #[error("Conversation already exists: {id}")]
    ConversationExists { id: ConversationId },

    #[error("Store lock poisoned")]
    LockPoisoned,
}

/// Capability registry errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Capability already registered: {name}")]
    DuplicateName { name: String },

    #[error("Unknown capability: {name}")]
    UnknownCapability { name: String },
}

/// Planner errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("Planning failed: {reason}")]
    PlanningFailed { reason: String },
}

/// Dispatch state machine errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Invalid decision for task {task_id}: task is {status:?}, not escalated")]
    InvalidDecision { task_id: TaskId, status: TaskStatus },

    #[error("Task {task_id} is not dispatchable from {status:?}")]
    NotDispatchable { task_id: TaskId, status: TaskStatus },
}

/// External provider errors (LLM completion, notification transport).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("No provider configured")]
    NotConfigured,

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: i32,
        message: String,
    },

    #[error("Rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// A capability's own reported failure, distinct from infrastructure errors.
///
/// Deliberately NOT a [`ForemanError`] variant: the dispatcher's
/// retry/escalation machine absorbs it and it never propagates past the
/// dispatcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Capability failure: {reason}")]
pub struct CapabilityFailure {
    pub reason: String,
}

impl CapabilityFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Master error type for all FOREMAN errors.
#[derive(Debug, Clone, Error)]
pub enum ForemanError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for FOREMAN operations.
pub type ForemanResult<T> = Result<T, ForemanError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display_not_found() {
        let id = ConversationId::generate();
        let err = StoreError::ConversationNotFound { id };
        let msg = format!("{}", err);
        assert!(msg.contains("Conversation not found"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::UnknownCapability {
            name: "ping".to_string(),
        };
        assert!(format!("{}", err).contains("Unknown capability: ping"));

        let err = RegistryError::DuplicateName {
            name: "ping".to_string(),
        };
        assert!(format!("{}", err).contains("already registered"));
    }

    #[test]
    fn test_dispatch_error_display_invalid_decision() {
        let err = DispatchError::InvalidDecision {
            task_id: TaskId::generate(),
            status: TaskStatus::Running,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Invalid decision"));
        assert!(msg.contains("Running"));
    }

    #[test]
    fn test_provider_error_display_request_failed() {
        let err = ProviderError::RequestFailed {
            provider: "openai".to_string(),
            status: 500,
            message: "boom".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("openai"));
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }

    #[test]
    fn test_foreman_error_from_variants() {
        let store = ForemanError::from(StoreError::LockPoisoned);
        assert!(matches!(store, ForemanError::Store(_)));

        let registry = ForemanError::from(RegistryError::DuplicateName {
            name: "x".to_string(),
        });
        assert!(matches!(registry, ForemanError::Registry(_)));

        let plan = ForemanError::from(PlanError::PlanningFailed {
            reason: "empty".to_string(),
        });
        assert!(matches!(plan, ForemanError::Plan(_)));

        let provider = ForemanError::from(ProviderError::NotConfigured);
        assert!(matches!(provider, ForemanError::Provider(_)));

        let config = ForemanError::from(ConfigError::MissingRequired {
            field: "max_attempts".to_string(),
        });
        assert!(matches!(config, ForemanError::Config(_)));
    }

    #[test]
    fn test_capability_failure_display() {
        let err = CapabilityFailure::new("timeout");
        assert!(format!("{}", err).contains("timeout"));
    }
}
