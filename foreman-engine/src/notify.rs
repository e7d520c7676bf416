//! Escalation notification channel.
//!
//! Notification is an opaque collaborator: failures are logged and never
//! block task progress.

use foreman_core::{ConversationId, ForemanResult, TaskId};
use serde::{Deserialize, Serialize};

/// Event handed to the notification channel when a task escalates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationNotice {
    pub conversation_id: ConversationId,
    pub task_id: TaskId,
    pub capability: String,
    pub attempts: u32,
    pub reason: String,
}

/// Trait for escalation notifiers.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an escalation notice.
    ///
    /// The dispatcher logs a delivery failure and moves on; it is never
    /// retried and never surfaces to the caller.
    async fn notify(&self, notice: &EscalationNotice) -> ForemanResult<()>;
}

/// Notifier that writes the notice to the process log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> ForemanResult<()> {
        tracing::warn!(
            conversation_id = %notice.conversation_id,
            task_id = %notice.task_id,
            capability = %notice.capability,
            attempts = notice.attempts,
            reason = %notice.reason,
            "task escalated, awaiting approval"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let notifier = LogNotifier;
        let notice = EscalationNotice {
            conversation_id: ConversationId::generate(),
            task_id: TaskId::generate(),
            capability: "always_fails".to_string(),
            attempts: 2,
            reason: "retries exhausted".to_string(),
        };
        assert!(notifier.notify(&notice).await.is_ok());
    }
}
