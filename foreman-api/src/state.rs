//! Shared application state for Axum routers.

use foreman_engine::ConversationManager;
use std::sync::Arc;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// The conversation manager: created at process start, torn down at
    /// process stop.
    pub manager: Arc<ConversationManager>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(manager: Arc<ConversationManager>) -> Self {
        Self {
            manager,
            start_time: std::time::Instant::now(),
        }
    }
}
