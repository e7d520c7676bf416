//! Error Types for the FOREMAN API
//!
//! ApiError pairs an ErrorCode with a human-readable message and renders as
//! a JSON body with the matching HTTP status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use foreman_core::{DispatchError, ForemanError, PlanError, RegistryError, StoreError};
use serde::{Deserialize, Serialize};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request contains invalid input data
    InvalidInput,

    /// Requested conversation does not exist
    ConversationNotFound,

    /// Requested task does not exist
    TaskNotFound,

    /// Referenced capability is not registered
    CapabilityNotFound,

    /// Operation conflicts with current state (e.g. decision on a
    /// non-escalated task)
    StateConflict,

    /// Planner could not derive tasks
    PlanningFailed,

    /// Upstream provider unavailable
    ServiceUnavailable,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::PlanningFailed => StatusCode::BAD_REQUEST,

            ErrorCode::ConversationNotFound
            | ErrorCode::TaskNotFound
            | ErrorCode::CapabilityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::StateConflict => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// API ERROR
// ============================================================================

/// Structured error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        (status, Json(self)).into_response()
    }
}

impl From<ForemanError> for ApiError {
    fn from(err: ForemanError) -> Self {
        let message = err.to_string();
        let code = match &err {
            ForemanError::Store(StoreError::ConversationNotFound { .. }) => {
                ErrorCode::ConversationNotFound
            }
            ForemanError::Store(StoreError::TaskNotFound { .. }) => ErrorCode::TaskNotFound,
            ForemanError::Store(StoreError::ConversationExists { .. }) => ErrorCode::StateConflict,
            ForemanError::Store(StoreError::LockPoisoned) => ErrorCode::InternalError,
            ForemanError::Registry(RegistryError::UnknownCapability { .. }) => {
                ErrorCode::CapabilityNotFound
            }
            ForemanError::Registry(RegistryError::DuplicateName { .. }) => ErrorCode::StateConflict,
            ForemanError::Plan(PlanError::PlanningFailed { .. }) => ErrorCode::PlanningFailed,
            ForemanError::Dispatch(DispatchError::InvalidDecision { .. })
            | ForemanError::Dispatch(DispatchError::NotDispatchable { .. }) => {
                ErrorCode::StateConflict
            }
            ForemanError::Provider(_) => ErrorCode::ServiceUnavailable,
            ForemanError::Config(_) => ErrorCode::InternalError,
        };
        ApiError::new(code, message)
    }
}

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use foreman_core::{ConversationId, TaskId, TaskStatus};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ErrorCode::ConversationNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ErrorCode::StateConflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InvalidInput.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_mapping() {
        let err: ApiError = ForemanError::from(StoreError::ConversationNotFound {
            id: ConversationId::generate(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ConversationNotFound);
    }

    #[test]
    fn test_invalid_decision_maps_to_conflict() {
        let err: ApiError = ForemanError::from(DispatchError::InvalidDecision {
            task_id: TaskId::generate(),
            status: TaskStatus::Running,
        })
        .into();
        assert_eq!(err.code, ErrorCode::StateConflict);
    }

    #[test]
    fn test_unknown_capability_maps_to_not_found() {
        let err: ApiError = ForemanError::from(RegistryError::UnknownCapability {
            name: "ping".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::CapabilityNotFound);
    }

    #[test]
    fn test_error_code_serde_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::ConversationNotFound).unwrap();
        assert_eq!(json, "\"CONVERSATION_NOT_FOUND\"");
    }
}
