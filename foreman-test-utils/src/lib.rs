//! FOREMAN Test Utilities
//!
//! Centralized test infrastructure for the FOREMAN workspace:
//! - Scripted capabilities for dispatch scenarios
//! - Mock completion provider for planner tests
//! - Test fixtures for common entities
//! - Proptest generators for core types

// Re-export core types for convenience
pub use foreman_core::{
    CapabilityFailure, Conversation, ConversationId, ConversationStatus, Decision, EngineConfig,
    ForemanResult, Message, MessagePayload, MessageRole, OutcomeStatus, Task, TaskId, TaskSpec,
    TaskStatus,
};
pub use foreman_registry::{Capability, CapabilityRegistry};
pub use foreman_store::{InMemoryTraceStore, TraceStore};

use foreman_core::ForemanError;
use foreman_llm::CompletionProvider;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// SCRIPTED CAPABILITIES
// ============================================================================

/// Capability that always succeeds, echoing a fixed payload.
#[derive(Debug, Clone)]
pub struct PingCapability;

#[async_trait::async_trait]
impl Capability for PingCapability {
    async fn run(&self, _input: &Value) -> Result<Value, CapabilityFailure> {
        Ok(json!({"status": "pong"}))
    }
}

/// Capability that fails a fixed number of times, then succeeds.
#[derive(Debug)]
pub struct FlakyCapability {
    remaining_failures: AtomicU32,
}

impl FlakyCapability {
    pub fn failing(times: u32) -> Self {
        Self {
            remaining_failures: AtomicU32::new(times),
        }
    }
}

#[async_trait::async_trait]
impl Capability for FlakyCapability {
    async fn run(&self, _input: &Value) -> Result<Value, CapabilityFailure> {
        if self.remaining_failures.load(Ordering::SeqCst) > 0 {
            self.remaining_failures.fetch_sub(1, Ordering::SeqCst);
            return Err(CapabilityFailure::new("temporary failure"));
        }
        Ok(json!({"status": "recovered"}))
    }
}

/// Capability that never succeeds.
#[derive(Debug, Clone)]
pub struct AlwaysFailsCapability;

#[async_trait::async_trait]
impl Capability for AlwaysFailsCapability {
    async fn run(&self, _input: &Value) -> Result<Value, CapabilityFailure> {
        Err(CapabilityFailure::new("service unavailable"))
    }
}

// ============================================================================
// MOCK COMPLETION PROVIDER
// ============================================================================

/// Completion provider returning a canned response.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    response: Option<String>,
}

impl MockCompletionProvider {
    /// Always answer with `response`.
    pub fn answering(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
        }
    }

    /// Fail every completion call.
    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(&self, _prompt: &str) -> ForemanResult<String> {
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(ForemanError::Provider(
                foreman_core::ProviderError::RequestFailed {
                    provider: "mock".to_string(),
                    status: 503,
                    message: "scripted failure".to_string(),
                },
            )),
        }
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A conversation opened for a throwaway goal.
pub fn conversation_fixture() -> Conversation {
    Conversation::new("ping service X")
}

/// A pending task targeting the given capability.
pub fn task_fixture(conversation_id: ConversationId, capability: &str) -> Task {
    Task::from_spec(
        conversation_id,
        TaskSpec::new(capability, json!({"target": "service X"})),
        3,
    )
}

/// A registry preloaded with the scripted capabilities: `ping`, `flaky`
/// (fails twice), and `always_fails`.
pub fn registry_fixture() -> CapabilityRegistry {
    let mut registry = CapabilityRegistry::new();
    registry
        .register("ping", Box::new(PingCapability))
        .expect("fresh registry");
    registry
        .register("flaky", Box::new(FlakyCapability::failing(2)))
        .expect("fresh registry");
    registry
        .register("always_fails", Box::new(AlwaysFailsCapability))
        .expect("fresh registry");
    registry
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod strategies {
    use super::*;
    use proptest::prelude::*;

    /// Any task status.
    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Pending),
            Just(TaskStatus::Running),
            Just(TaskStatus::Succeeded),
            Just(TaskStatus::Escalated),
            Just(TaskStatus::Failed),
        ]
    }

    /// Any decision.
    pub fn arb_decision() -> impl Strategy<Value = Decision> {
        prop_oneof![Just(Decision::Approve), Just(Decision::Deny)]
    }

    /// Non-empty printable goal strings.
    pub fn arb_goal() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 ]{1,64}".prop_filter("goal must not be blank", |s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flaky_capability_recovers() {
        let capability = FlakyCapability::failing(2);
        assert!(capability.run(&json!({})).await.is_err());
        assert!(capability.run(&json!({})).await.is_err());
        assert!(capability.run(&json!({})).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_provider_scripted_answer() {
        let provider = MockCompletionProvider::answering("[]");
        assert_eq!(provider.complete("anything").await.unwrap(), "[]");
        assert!(MockCompletionProvider::failing()
            .complete("anything")
            .await
            .is_err());
    }

    #[test]
    fn test_registry_fixture_has_scripted_capabilities() {
        let registry = registry_fixture();
        assert!(registry.contains("ping"));
        assert!(registry.contains("flaky"));
        assert!(registry.contains("always_fails"));
    }
}
