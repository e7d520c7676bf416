//! Goal decomposition.
//!
//! A planner is a pure function of the goal: it never touches the trace
//! store. The conversation manager materializes the returned templates into
//! tasks and records the planning messages itself.

use foreman_core::{PlanError, TaskSpec};
use foreman_llm::CompletionProvider;
use std::sync::Arc;

/// Trait for planners.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait::async_trait]
pub trait Planner: Send + Sync {
    /// Decompose a goal into an ordered list of task templates.
    ///
    /// # Errors
    /// `PlanError::PlanningFailed` when no tasks can be derived.
    async fn plan(&self, goal: &str) -> Result<Vec<TaskSpec>, PlanError>;
}

/// Planner returning a fixed task list for every goal.
///
/// The stand-in strategy: useful for tests, demos, and pipelines whose task
/// structure does not depend on the goal text.
#[derive(Debug, Clone)]
pub struct StaticPlanner {
    specs: Vec<TaskSpec>,
}

impl StaticPlanner {
    pub fn new(specs: Vec<TaskSpec>) -> Self {
        Self { specs }
    }
}

#[async_trait::async_trait]
impl Planner for StaticPlanner {
    async fn plan(&self, goal: &str) -> Result<Vec<TaskSpec>, PlanError> {
        if goal.trim().is_empty() {
            return Err(PlanError::PlanningFailed {
                reason: "goal is empty".to_string(),
            });
        }
        if self.specs.is_empty() {
            return Err(PlanError::PlanningFailed {
                reason: "no tasks configured".to_string(),
            });
        }
        Ok(self.specs.clone())
    }
}

/// Planner that asks a completion provider to decompose the goal.
///
/// The model is prompted for a JSON array of task templates; anything it
/// cannot produce - transport failure, malformed output, empty plan -
/// surfaces as `PlanningFailed`.
pub struct LlmPlanner {
    provider: Arc<dyn CompletionProvider>,
}

const PLAN_PROMPT: &str = "Decompose the goal below into an ordered JSON array of tasks. \
Each task is an object with a \"capability\" string naming the operation to invoke \
and an \"input\" object with its payload. Respond with the JSON array only.\n\nGoal: ";

impl LlmPlanner {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Extract the task array from model output, tolerating code fences and
    /// prose around the JSON.
    fn parse_specs(text: &str) -> Result<Vec<TaskSpec>, PlanError> {
        let start = text.find('[');
        let end = text.rfind(']');
        let json = match (start, end) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => {
                return Err(PlanError::PlanningFailed {
                    reason: "no JSON array in completion".to_string(),
                })
            }
        };

        let specs: Vec<TaskSpec> =
            serde_json::from_str(json).map_err(|e| PlanError::PlanningFailed {
                reason: format!("malformed plan: {}", e),
            })?;

        if specs.is_empty() {
            return Err(PlanError::PlanningFailed {
                reason: "plan contained no tasks".to_string(),
            });
        }
        Ok(specs)
    }
}

#[async_trait::async_trait]
impl Planner for LlmPlanner {
    async fn plan(&self, goal: &str) -> Result<Vec<TaskSpec>, PlanError> {
        if goal.trim().is_empty() {
            return Err(PlanError::PlanningFailed {
                reason: "goal is empty".to_string(),
            });
        }

        let prompt = format!("{}{}", PLAN_PROMPT, goal);
        let completion =
            self.provider
                .complete(&prompt)
                .await
                .map_err(|e| PlanError::PlanningFailed {
                    reason: format!("completion failed: {}", e),
                })?;

        Self::parse_specs(&completion)
    }
}

impl std::fmt::Debug for LlmPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmPlanner")
            .field("model", &self.provider.model_id())
            .finish()
    }
}
