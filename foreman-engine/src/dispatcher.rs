//! Task dispatch: the retry/escalation state machine.
//!
//! For a single task: `Pending → Running → {Succeeded | back to Pending |
//! Escalated | Failed}`. Escalation suspends automatic progress until an
//! external approve/deny decision arrives; `Succeeded` and `Failed` are
//! terminal. Every transition appends a message to the trace - that audit
//! record is the contract this machine exists to honor.

use crate::{EscalationNotice, Notifier};
use foreman_core::{
    ApprovalPolicy, Decision, DispatchError, EngineConfig, ForemanResult, MessagePayload,
    MessageRole, Task, TaskId, TaskStatus,
};
use foreman_registry::CapabilityRegistry;
use foreman_store::{TaskStore, TraceStore, TraceStoreExt};
use std::sync::Arc;

/// Executes tasks against capabilities, handling retry and escalation.
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    tasks: TaskStore,
    trace: Arc<dyn TraceStore>,
    notifier: Arc<dyn Notifier>,
    config: EngineConfig,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        tasks: TaskStore,
        trace: Arc<dyn TraceStore>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            tasks,
            trace,
            notifier,
            config,
        }
    }

    /// Drive a pending task until it is terminal or escalated.
    ///
    /// Returns the status the task settled in. A `CapabilityFailure` never
    /// escapes this method: it either triggers a retry after the configured
    /// backoff or tips the task into `Escalated`.
    pub async fn run_task(&self, task_id: TaskId) -> ForemanResult<TaskStatus> {
        let mut task = self.tasks.get(task_id)?;
        if task.status != TaskStatus::Pending {
            return Err(DispatchError::NotDispatchable {
                task_id,
                status: task.status,
            }
            .into());
        }

        loop {
            task.attempts += 1;
            self.transition(&mut task, TaskStatus::Running, None)?;

            let capability = match self.registry.resolve(&task.capability) {
                Ok(capability) => capability,
                Err(err) => {
                    // Planner named a capability nobody registered. Terminal:
                    // retrying cannot make it appear.
                    let reason = err.to_string();
                    task.last_error = Some(reason.clone());
                    self.transition(&mut task, TaskStatus::Failed, Some(reason))?;
                    return Ok(TaskStatus::Failed);
                }
            };

            match capability.run(&task.input).await {
                Ok(output) => {
                    task.last_error = None;
                    self.trace.append_chained(
                        task.conversation_id,
                        MessageRole::Executor,
                        MessagePayload::TaskOutput {
                            task_id: task.task_id,
                            attempt: task.attempts,
                            output,
                        },
                    )?;
                    self.transition(&mut task, TaskStatus::Succeeded, None)?;
                    return Ok(TaskStatus::Succeeded);
                }
                Err(failure) => {
                    task.last_error = Some(failure.reason.clone());
                    if task.attempts < task.max_attempts {
                        self.transition(
                            &mut task,
                            TaskStatus::Pending,
                            Some(failure.reason),
                        )?;
                        tokio::time::sleep(self.config.retry.backoff.delay_for(task.attempts))
                            .await;
                    } else {
                        self.transition(
                            &mut task,
                            TaskStatus::Escalated,
                            Some(failure.reason.clone()),
                        )?;
                        self.send_escalation_notice(&task, &failure.reason).await;
                        return Ok(TaskStatus::Escalated);
                    }
                }
            }
        }
    }

    /// Apply a human decision to an escalated task.
    ///
    /// `Approve` puts the task back in `Pending` with attempts reset per the
    /// approval policy; `Deny` is terminal. Decisions on tasks in any other
    /// state are `InvalidDecision`.
    pub async fn decide(&self, task_id: TaskId, decision: Decision) -> ForemanResult<TaskStatus> {
        let mut task = self.tasks.get(task_id)?;
        if task.status != TaskStatus::Escalated {
            return Err(DispatchError::InvalidDecision {
                task_id,
                status: task.status,
            }
            .into());
        }

        self.trace.append_chained(
            task.conversation_id,
            MessageRole::System,
            MessagePayload::Decision { task_id, decision },
        )?;

        match decision {
            Decision::Deny => {
                self.transition(&mut task, TaskStatus::Failed, Some("denied".to_string()))?;
                Ok(TaskStatus::Failed)
            }
            Decision::Approve => {
                task.attempts = match self.config.approval {
                    ApprovalPolicy::FullCycle => 0,
                    ApprovalPolicy::SingleAttempt => task.max_attempts.saturating_sub(1),
                };
                self.transition(&mut task, TaskStatus::Pending, Some("approved".to_string()))?;
                Ok(TaskStatus::Pending)
            }
        }
    }

    /// Force a non-terminal task to `Failed` during cancellation.
    pub fn cancel_task(&self, task_id: TaskId, reason: &str) -> ForemanResult<()> {
        let mut task = self.tasks.get(task_id)?;
        if task.is_terminal() {
            return Ok(());
        }
        task.last_error = Some(reason.to_string());
        self.transition(&mut task, TaskStatus::Failed, Some(reason.to_string()))?;
        Ok(())
    }

    /// Move a task to a new state, persist it, and trace the transition.
    fn transition(
        &self,
        task: &mut Task,
        to: TaskStatus,
        reason: Option<String>,
    ) -> ForemanResult<()> {
        let from = task.status;
        task.set_status(to);
        self.tasks.update(task.clone())?;
        self.trace.append_chained(
            task.conversation_id,
            MessageRole::Executor,
            MessagePayload::TaskTransition {
                task_id: task.task_id,
                capability: task.capability.clone(),
                from,
                to,
                attempt: task.attempts,
                reason,
            },
        )?;
        Ok(())
    }

    /// Best-effort escalation notification; a delivery failure is logged,
    /// never retried, and never blocks the task.
    async fn send_escalation_notice(&self, task: &Task, reason: &str) {
        let notice = EscalationNotice {
            conversation_id: task.conversation_id,
            task_id: task.task_id,
            capability: task.capability.clone(),
            attempts: task.attempts,
            reason: reason.to_string(),
        };
        if let Err(err) = self.notifier.notify(&notice).await {
            tracing::warn!(
                task_id = %task.task_id,
                error = %err,
                "escalation notification failed"
            );
        }
    }
}
