//! FOREMAN API - HTTP Control Surface
//!
//! The minimal binding over the conversation manager: start a conversation
//! from a goal, read status/trace, submit an approve/deny decision. The
//! transport is deliberately thin; the lifecycle contract lives in
//! foreman-engine.

mod config;
mod error;
mod notify;
mod routes;
mod state;

pub use config::{engine_config_from_env, ApiConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use notify::WebhookNotifier;
pub use state::AppState;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router over shared application state.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> ApiResult<Router> {
    let cors = if config.cors_origins.is_empty() {
        // Dev mode: allow all
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| {
                    ApiError::invalid_input(format!("Invalid CORS origin: {}", origin))
                })
            })
            .collect::<ApiResult<_>>()?;
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    Ok(Router::new()
        .route("/conversations", post(routes::conversation::start))
        .route("/conversations/:id", get(routes::conversation::status))
        .route("/conversations/:id/trace", get(routes::conversation::trace))
        .route("/conversations/:id/cancel", post(routes::conversation::cancel))
        .route("/tasks/:id/decision", post(routes::decision::decide))
        .route("/health/ping", get(routes::health::ping))
        .route("/health/live", get(routes::health::liveness))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foreman_core::EngineConfig;
    use foreman_engine::{ConversationManager, StaticPlanner};
    use foreman_test_utils::registry_fixture;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let manager = ConversationManager::new(
            Arc::new(registry_fixture()),
            Arc::new(StaticPlanner::new(vec![foreman_core::TaskSpec::new(
                "ping",
                serde_json::json!({}),
            )])),
            EngineConfig::default(),
        )
        .unwrap();
        AppState::new(Arc::new(manager))
    }

    #[test]
    fn test_router_builds_in_dev_mode() {
        let config = ApiConfig::default();
        assert!(create_api_router(test_state(), &config).is_ok());
    }

    #[test]
    fn test_router_rejects_malformed_origin() {
        let mut config = ApiConfig::default();
        config.cors_origins = vec!["not a header value\u{0000}".to_string()];
        assert!(create_api_router(test_state(), &config).is_err());
    }
}
