//! In-memory conversation and task state stores.
//!
//! The orchestrator's mutable state lives in explicit store objects passed by
//! handle to each component: created at process start, torn down at process
//! stop, swappable for a persistent backend later.

use foreman_core::{Conversation, ConversationId, ForemanResult, StoreError, Task, TaskId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory store of conversation records.
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a newly opened conversation.
    pub fn insert(&self, conversation: Conversation) -> ForemanResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if inner.contains_key(&conversation.conversation_id) {
            return Err(StoreError::ConversationExists {
                id: conversation.conversation_id,
            }
            .into());
        }
        inner.insert(conversation.conversation_id, conversation);
        Ok(())
    }

    /// Fetch a conversation by id.
    pub fn get(&self, id: ConversationId) -> ForemanResult<Conversation> {
        let inner = self.inner.read().map_err(|_| StoreError::LockPoisoned)?;
        inner
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::ConversationNotFound { id }.into())
    }

    /// Replace a conversation record.
    pub fn update(&self, conversation: Conversation) -> ForemanResult<()> {
        let mut inner = self.inner.write().map_err(|_| StoreError::LockPoisoned)?;
        if !inner.contains_key(&conversation.conversation_id) {
            return Err(StoreError::ConversationNotFound {
                id: conversation.conversation_id,
            }
            .into());
        }
        inner.insert(conversation.conversation_id, conversation);
        Ok(())
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ConversationStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// In-memory store of tasks, preserving per-conversation insertion order.
/// Planner order is dispatch order, so the order index is part of the
/// contract.
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
    by_conversation: Arc<RwLock<HashMap<ConversationId, Vec<TaskId>>>>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            by_conversation: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a materialized task at the end of its conversation's order.
    pub fn insert(&self, task: Task) -> ForemanResult<()> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut order = self
            .by_conversation
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        order
            .entry(task.conversation_id)
            .or_default()
            .push(task.task_id);
        tasks.insert(task.task_id, task);
        Ok(())
    }

    /// Fetch a task by id.
    pub fn get(&self, id: TaskId) -> ForemanResult<Task> {
        let tasks = self.tasks.read().map_err(|_| StoreError::LockPoisoned)?;
        tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::TaskNotFound { id }.into())
    }

    /// Replace a task record.
    pub fn update(&self, task: Task) -> ForemanResult<()> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        if !tasks.contains_key(&task.task_id) {
            return Err(StoreError::TaskNotFound { id: task.task_id }.into());
        }
        tasks.insert(task.task_id, task);
        Ok(())
    }

    /// All tasks of a conversation, in insertion (planner) order.
    pub fn for_conversation(&self, id: ConversationId) -> ForemanResult<Vec<Task>> {
        let tasks = self.tasks.read().map_err(|_| StoreError::LockPoisoned)?;
        let order = self
            .by_conversation
            .read()
            .map_err(|_| StoreError::LockPoisoned)?;
        let ids = order.get(&id).cloned().unwrap_or_default();
        Ok(ids
            .into_iter()
            .filter_map(|task_id| tasks.get(&task_id).cloned())
            .collect())
    }
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for TaskStore {
    fn clone(&self) -> Self {
        Self {
            tasks: Arc::clone(&self.tasks),
            by_conversation: Arc::clone(&self.by_conversation),
        }
    }
}
