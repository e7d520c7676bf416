//! Core entity structures

use crate::{
    ConversationId, ConversationStatus, Decision, MessageId, MessageRole, OutcomeStatus, TaskId,
    TaskStatus, Timestamp,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Conversation - top-level lifecycle container.
/// Opened on intake, mutated by every stage, closed on closeout. Its messages
/// live in the trace store; the struct itself carries only the lifecycle
/// fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: ConversationId,
    pub goal: String,
    pub status: ConversationStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub closed_at: Option<Timestamp>,
    pub outcome: Option<ConversationOutcome>,
}

impl Conversation {
    /// Open a new conversation for a goal.
    pub fn new(goal: &str) -> Self {
        let now = Utc::now();
        Self {
            conversation_id: ConversationId::generate(),
            goal: goal.to_string(),
            status: ConversationStatus::Open,
            created_at: now,
            updated_at: now,
            closed_at: None,
            outcome: None,
        }
    }

    /// Move to a new status.
    pub fn set_status(&mut self, status: ConversationStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Close the conversation with an outcome.
    pub fn close(&mut self, status: ConversationStatus, outcome: ConversationOutcome) {
        let now = Utc::now();
        self.status = status;
        self.outcome = Some(outcome);
        self.closed_at = Some(now);
        self.updated_at = now;
    }
}

/// Outcome of a closed conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationOutcome {
    pub status: OutcomeStatus,
    pub summary: String,
    pub error: Option<String>,
}

/// Message - append-only audit record of a lifecycle event.
/// Immutable once appended; the per-conversation sequence is never reordered
/// or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    pub conversation_id: ConversationId,
    /// Previous message in the chain, for continuity across stages.
    pub parent_id: Option<MessageId>,
    pub role: MessageRole,
    pub payload: MessagePayload,
    pub created_at: Timestamp,
}

impl Message {
    /// Create a message for a conversation.
    pub fn new(conversation_id: ConversationId, role: MessageRole, payload: MessagePayload) -> Self {
        Self {
            message_id: MessageId::generate(),
            conversation_id,
            parent_id: None,
            role,
            payload,
            created_at: Utc::now(),
        }
    }

    /// Chain onto a previous message.
    pub fn with_parent(mut self, parent_id: MessageId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// Structured payload of a trace message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessagePayload {
    /// Goal received, conversation opened
    Intake { goal: String },
    /// Planner output: the ordered task list
    Plan { tasks: Vec<TaskSpec> },
    /// Planner could not derive tasks
    PlanningFailed { reason: String },
    /// A task moved between dispatch states
    TaskTransition {
        task_id: TaskId,
        capability: String,
        from: TaskStatus,
        to: TaskStatus,
        attempt: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Output produced by a successful capability invocation
    TaskOutput {
        task_id: TaskId,
        attempt: u32,
        output: serde_json::Value,
    },
    /// Human decision on an escalated task
    Decision { task_id: TaskId, decision: Decision },
    /// Conversation cancelled before all tasks finished
    Cancelled { reason: String },
    /// Final summary
    Closeout { outcome: ConversationOutcome },
}

/// Planner-facing task template; materialized into a [`Task`] by the
/// conversation manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Name of the capability to invoke
    pub capability: String,
    /// Input payload handed to the capability
    pub input: serde_json::Value,
}

impl TaskSpec {
    pub fn new(capability: &str, input: serde_json::Value) -> Self {
        Self {
            capability: capability.to_string(),
            input,
        }
    }
}

/// Task - one unit of dispatchable work owned by a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub conversation_id: ConversationId,
    pub capability: String,
    pub input: serde_json::Value,
    pub status: TaskStatus,
    /// Failures so far in the current automatic cycle
    pub attempts: u32,
    pub max_attempts: u32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Task {
    /// Materialize a task from a planner template.
    pub fn from_spec(conversation_id: ConversationId, spec: TaskSpec, max_attempts: u32) -> Self {
        let now = Utc::now();
        Self {
            task_id: TaskId::generate(),
            conversation_id,
            capability: spec.capability,
            input: spec.input,
            status: TaskStatus::Pending,
            attempts: 0,
            max_attempts,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to a new status.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Whether the task can never transition again.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Point-in-time view of a conversation, its tasks, and its trace.
/// Returned by the conversation manager's `status` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub conversation: Conversation,
    pub tasks: Vec<Task>,
    pub messages: Vec<Message>,
}
