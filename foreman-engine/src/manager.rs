//! Conversation lifecycle orchestration: intake → plan → dispatch → closeout.

use crate::{Dispatcher, LogNotifier, Notifier, Planner};
use foreman_core::{
    Conversation, ConversationId, ConversationOutcome, ConversationSnapshot, ConversationStatus,
    Decision, EngineConfig, ForemanResult, MessagePayload, MessageRole, OutcomeStatus, PlanError,
    Task, TaskId, TaskStatus,
};
use foreman_registry::CapabilityRegistry;
use foreman_store::{ConversationStore, InMemoryTraceStore, TaskStore, TraceStore, TraceStoreExt};
use std::sync::Arc;

/// Orchestrates the full conversation lifecycle.
///
/// Dispatch is sequential in planner order - the minimum correct behavior,
/// and the one that keeps audit ordering trivially right. Escalation leaves
/// the conversation in `AwaitingApproval` with no lock held; an external
/// `decide` call, arriving arbitrarily later, resumes it.
pub struct ConversationManager {
    conversations: ConversationStore,
    tasks: TaskStore,
    trace: Arc<dyn TraceStore>,
    dispatcher: Dispatcher,
    planner: Arc<dyn Planner>,
    config: EngineConfig,
}

impl ConversationManager {
    /// Build a manager over fresh in-memory stores and a log-only notifier.
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        planner: Arc<dyn Planner>,
        config: EngineConfig,
    ) -> ForemanResult<Self> {
        Self::with_notifier(registry, planner, Arc::new(LogNotifier), config)
    }

    /// Build a manager with an explicit escalation notifier.
    pub fn with_notifier(
        registry: Arc<CapabilityRegistry>,
        planner: Arc<dyn Planner>,
        notifier: Arc<dyn Notifier>,
        config: EngineConfig,
    ) -> ForemanResult<Self> {
        config.validate()?;
        let conversations = ConversationStore::new();
        let tasks = TaskStore::new();
        let trace: Arc<dyn TraceStore> = Arc::new(InMemoryTraceStore::new());
        let dispatcher = Dispatcher::new(
            registry,
            tasks.clone(),
            Arc::clone(&trace),
            notifier,
            config.clone(),
        );
        Ok(Self {
            conversations,
            tasks,
            trace,
            dispatcher,
            planner,
            config,
        })
    }

    /// Intake a goal: open the conversation, plan it, and dispatch.
    ///
    /// Always returns the conversation id. A goal that cannot be planned
    /// yields a conversation already closed as `ClosedEmpty`, with the
    /// planning failure recorded in its trace - never one left open
    /// indefinitely.
    pub async fn start(&self, goal: &str) -> ForemanResult<ConversationId> {
        let conversation = Conversation::new(goal);
        let conversation_id = conversation.conversation_id;
        self.conversations.insert(conversation)?;
        self.trace.open(conversation_id)?;
        self.trace.append_chained(
            conversation_id,
            MessageRole::Intake,
            MessagePayload::Intake {
                goal: goal.to_string(),
            },
        )?;
        tracing::info!(%conversation_id, "conversation opened");

        let specs = match self.planner.plan(goal).await {
            Ok(specs) if specs.is_empty() => Err(PlanError::PlanningFailed {
                reason: "planner returned no tasks".to_string(),
            }),
            other => other,
        };

        match specs {
            Err(PlanError::PlanningFailed { reason }) => {
                tracing::warn!(%conversation_id, %reason, "planning failed");
                self.trace.append_chained(
                    conversation_id,
                    MessageRole::Planner,
                    MessagePayload::PlanningFailed {
                        reason: reason.clone(),
                    },
                )?;
                let mut conversation = self.conversations.get(conversation_id)?;
                conversation.close(
                    ConversationStatus::ClosedEmpty,
                    ConversationOutcome {
                        status: OutcomeStatus::Failure,
                        summary: "planning produced no tasks".to_string(),
                        error: Some(reason),
                    },
                );
                self.conversations.update(conversation)?;
                Ok(conversation_id)
            }
            Ok(specs) => {
                self.trace.append_chained(
                    conversation_id,
                    MessageRole::Planner,
                    MessagePayload::Plan {
                        tasks: specs.clone(),
                    },
                )?;
                for spec in specs {
                    let task =
                        Task::from_spec(conversation_id, spec, self.config.retry.max_attempts);
                    self.tasks.insert(task)?;
                }
                self.dispatch_from(conversation_id).await?;
                Ok(conversation_id)
            }
        }
    }

    /// Point-in-time snapshot of a conversation, its tasks, and its trace.
    pub fn status(&self, conversation_id: ConversationId) -> ForemanResult<ConversationSnapshot> {
        let conversation = self.conversations.get(conversation_id)?;
        let tasks = self.tasks.for_conversation(conversation_id)?;
        let messages = self.trace.read_all(conversation_id)?;
        Ok(ConversationSnapshot {
            conversation,
            tasks,
            messages,
        })
    }

    /// Export a conversation's trace for audit printing.
    pub fn export_trace(
        &self,
        conversation_id: ConversationId,
    ) -> ForemanResult<foreman_store::TraceDocument> {
        // Existence check first, so an unknown id reports ConversationNotFound
        self.conversations.get(conversation_id)?;
        self.trace.export(conversation_id)
    }

    /// Apply a human decision to an escalated task, then resume dispatch.
    pub async fn decide(&self, task_id: TaskId, decision: Decision) -> ForemanResult<()> {
        let task = self.tasks.get(task_id)?;
        self.dispatcher.decide(task_id, decision).await?;
        tracing::info!(%task_id, %decision, "decision applied");
        self.dispatch_from(task.conversation_id).await
    }

    /// Cancel a conversation: every non-terminal task fails, the
    /// cancellation is traced, and closeout runs. Idempotent on already
    /// closed conversations.
    pub async fn cancel(&self, conversation_id: ConversationId) -> ForemanResult<()> {
        let conversation = self.conversations.get(conversation_id)?;
        if conversation.status.is_terminal() {
            return Ok(());
        }

        for task in self.tasks.for_conversation(conversation_id)? {
            self.dispatcher.cancel_task(task.task_id, "conversation cancelled")?;
        }
        self.trace.append_chained(
            conversation_id,
            MessageRole::System,
            MessagePayload::Cancelled {
                reason: "conversation cancelled".to_string(),
            },
        )?;
        self.closeout(conversation_id)
    }

    /// Run pending tasks in planner order until one escalates or all are
    /// terminal; close out in the latter case.
    async fn dispatch_from(&self, conversation_id: ConversationId) -> ForemanResult<()> {
        let mut conversation = self.conversations.get(conversation_id)?;
        if conversation.status == ConversationStatus::AwaitingApproval {
            conversation.set_status(ConversationStatus::Open);
            self.conversations.update(conversation)?;
        }

        for task in self.tasks.for_conversation(conversation_id)? {
            if task.status != TaskStatus::Pending {
                continue;
            }
            let status = self.dispatcher.run_task(task.task_id).await?;
            if status == TaskStatus::Escalated {
                let mut conversation = self.conversations.get(conversation_id)?;
                conversation.set_status(ConversationStatus::AwaitingApproval);
                self.conversations.update(conversation)?;
                return Ok(());
            }
        }

        let all_terminal = self
            .tasks
            .for_conversation(conversation_id)?
            .iter()
            .all(Task::is_terminal);
        if all_terminal {
            self.closeout(conversation_id)?;
        }
        Ok(())
    }

    /// Summarize terminal tasks and close the conversation.
    fn closeout(&self, conversation_id: ConversationId) -> ForemanResult<()> {
        let tasks = self.tasks.for_conversation(conversation_id)?;
        let total = tasks.len();
        let succeeded = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Succeeded)
            .count();
        let failed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Failed)
            .count();

        let status = if failed == 0 {
            OutcomeStatus::Success
        } else if succeeded > 0 {
            OutcomeStatus::Partial
        } else {
            OutcomeStatus::Failure
        };
        let error = tasks
            .iter()
            .find(|t| t.status == TaskStatus::Failed)
            .and_then(|t| t.last_error.clone());
        let outcome = ConversationOutcome {
            status,
            summary: format!("{} of {} tasks succeeded, {} failed", succeeded, total, failed),
            error,
        };

        self.trace.append_chained(
            conversation_id,
            MessageRole::Closeout,
            MessagePayload::Closeout {
                outcome: outcome.clone(),
            },
        )?;

        let mut conversation = self.conversations.get(conversation_id)?;
        conversation.close(ConversationStatus::Closed, outcome);
        self.conversations.update(conversation)?;
        tracing::info!(%conversation_id, ?status, "conversation closed");
        Ok(())
    }
}
