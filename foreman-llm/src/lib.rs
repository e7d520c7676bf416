//! FOREMAN LLM - Completion Provider Abstraction
//!
//! Provider-agnostic trait for text completion. The planner treats a
//! language-model call as an opaque capability: prompt in, text out.
//! Actual provider implementations live under [`providers`].

use foreman_core::ForemanResult;

pub mod providers;

pub use providers::OpenAiCompletionProvider;

/// Trait for completion providers.
/// Implementations must be thread-safe (Send + Sync).
///
/// Failures (timeout, malformed response) surface as
/// `ForemanError::Provider`; the planner folds them into `PlanningFailed`.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Complete a prompt.
    ///
    /// # Returns
    /// * `Ok(String)` - The model's text output
    /// * `Err(ForemanError::Provider)` - If the call fails
    async fn complete(&self, prompt: &str) -> ForemanResult<String>;

    /// Identifier of the model behind this provider.
    fn model_id(&self) -> &str;
}
