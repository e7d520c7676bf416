//! Enum types for FOREMAN entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a conversation (lifecycle container).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    /// Intake done, tasks may still be planned or running
    Open,
    /// At least one task is escalated, waiting on a human decision
    AwaitingApproval,
    /// All tasks reached a terminal state and closeout ran
    Closed,
    /// Planning produced no tasks; closed immediately with the reason traced
    ClosedEmpty,
}

impl ConversationStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::ClosedEmpty)
    }
}

/// Role of the lifecycle stage that appended a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Intake,
    Planner,
    Executor,
    Closeout,
    System,
}

/// Status of a task in the dispatch state machine.
///
/// `Failed` is terminal ("failed-final"); a transient capability failure
/// sends the task back to `Pending` with the attempt count incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    /// Retries exhausted; automatic progress suspended pending approve/deny
    Escalated,
    Failed,
}

impl TaskStatus {
    /// Whether this status is terminal (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Human-in-the-loop decision on an escalated task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Deny,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approve => write!(f, "approve"),
            Decision::Deny => write!(f, "deny"),
        }
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Decision::Approve),
            "deny" => Ok(Decision::Deny),
            other => Err(format!("unknown decision: {}", other)),
        }
    }
}

/// Outcome status for closed conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Partial,
    Failure,
}
