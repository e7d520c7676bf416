//! FOREMAN API Server Entry Point
//!
//! Bootstraps configuration, assembles the capability registry and planner,
//! and starts the Axum HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use foreman_api::{
    create_api_router, engine_config_from_env, ApiConfig, ApiError, ApiResult, AppState,
    WebhookNotifier,
};
use foreman_engine::{
    ConversationManager, LlmPlanner, LogNotifier, Notifier, Planner, StaticPlanner,
};
use foreman_llm::OpenAiCompletionProvider;
use foreman_registry::{CapabilityRegistry, FnCapability};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let api_config = ApiConfig::from_env();
    let engine_config = engine_config_from_env();

    let registry = Arc::new(build_registry()?);
    let planner = build_planner();
    let notifier = build_notifier(&api_config);

    let manager = ConversationManager::with_notifier(registry, planner, notifier, engine_config)
        .map_err(|e| ApiError::internal_error(format!("Failed to build manager: {}", e)))?;
    let state = AppState::new(Arc::new(manager));

    let app: Router = create_api_router(state, &api_config)?;

    let addr = resolve_bind_addr(&api_config)?;
    tracing::info!(%addr, "Starting FOREMAN API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}

/// Built-in capabilities registered at startup.
fn build_registry() -> ApiResult<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();
    registry
        .register(
            "echo",
            Box::new(FnCapability::new(|input| {
                Box::pin(async move { Ok(input) })
            })),
        )
        .map_err(|e| ApiError::internal_error(format!("Failed to register capability: {}", e)))?;
    Ok(registry)
}

/// LLM-backed planner when a key is configured, otherwise a fixed echo plan.
fn build_planner() -> Arc<dyn Planner> {
    match std::env::var("FOREMAN_OPENAI_API_KEY") {
        Ok(api_key) => {
            let model = std::env::var("FOREMAN_OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string());
            tracing::info!(%model, "using LLM planner");
            let mut provider = OpenAiCompletionProvider::new(api_key, model);
            if let Ok(base_url) = std::env::var("FOREMAN_OPENAI_BASE_URL") {
                provider = provider.with_base_url(base_url);
            }
            Arc::new(LlmPlanner::new(Arc::new(provider)))
        }
        Err(_) => {
            tracing::info!("no LLM key configured, using static planner");
            Arc::new(StaticPlanner::new(vec![foreman_core::TaskSpec::new(
                "echo",
                serde_json::json!({"note": "replace with a real plan"}),
            )]))
        }
    }
}

fn build_notifier(config: &ApiConfig) -> Arc<dyn Notifier> {
    match &config.webhook_url {
        Some(url) => {
            let mut notifier = WebhookNotifier::new(url);
            if let Some(secret) = &config.webhook_secret {
                notifier = notifier.with_secret(secret);
            }
            Arc::new(notifier)
        }
        None => Arc::new(LogNotifier),
    }
}

fn resolve_bind_addr(config: &ApiConfig) -> ApiResult<SocketAddr> {
    let addr = format!("{}:{}", config.bind, config.port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
