//! Human-in-the-loop decision endpoint.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foreman_core::{Decision, TaskId};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DecisionRequest {
    pub decision: Decision,
}

/// POST /tasks/{id}/decision - Approve or deny an escalated task.
///
/// 409 if the task is not escalated, 404 if it does not exist.
pub async fn decide(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
    Json(body): Json<DecisionRequest>,
) -> ApiResult<StatusCode> {
    state.manager.decide(task_id, body.decision).await?;
    Ok(StatusCode::NO_CONTENT)
}
