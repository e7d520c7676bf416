//! Conversation endpoints: intake, status, and trace export.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use foreman_core::{ConversationId, ConversationSnapshot, ConversationStatus};
use foreman_store::TraceDocument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    pub goal: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartResponse {
    pub conversation_id: ConversationId,
    pub status: ConversationStatus,
}

/// POST /conversations - Start a conversation from a goal.
///
/// A goal that cannot be planned still answers 201: the conversation exists,
/// already closed as `closed_empty`, with the reason in its trace.
pub async fn start(
    State(state): State<AppState>,
    Json(body): Json<StartRequest>,
) -> ApiResult<(StatusCode, Json<StartResponse>)> {
    if body.goal.trim().is_empty() {
        return Err(ApiError::invalid_input("goal must not be blank"));
    }

    let conversation_id = state.manager.start(&body.goal).await?;
    let snapshot = state.manager.status(conversation_id)?;
    Ok((
        StatusCode::CREATED,
        Json(StartResponse {
            conversation_id,
            status: snapshot.conversation.status,
        }),
    ))
}

/// GET /conversations/{id} - Snapshot of a conversation, its tasks, and its
/// trace.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<Json<ConversationSnapshot>> {
    let snapshot = state.manager.status(id)?;
    Ok(Json(snapshot))
}

/// GET /conversations/{id}/trace - Audit export of the message trace.
pub async fn trace(
    State(state): State<AppState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<Json<TraceDocument>> {
    let document = state.manager.export_trace(id)?;
    Ok(Json(document))
}

/// POST /conversations/{id}/cancel - Fail all unfinished tasks and close.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<ConversationId>,
) -> ApiResult<StatusCode> {
    state.manager.cancel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
