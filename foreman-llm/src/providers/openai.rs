//! OpenAI-compatible chat completion provider

use crate::CompletionProvider;
use foreman_core::{ForemanError, ForemanResult, ProviderError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

// ============================================================================
// PROVIDER
// ============================================================================

/// Completion provider for OpenAI-compatible chat endpoints.
pub struct OpenAiCompletionProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: Option<f32>,
}

impl OpenAiCompletionProvider {
    /// Create a provider for a model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            temperature: None,
        }
    }

    /// Point at a compatible, non-default endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    async fn post_chat(&self, request: &ChatRequest) -> ForemanResult<ChatResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                ForemanError::Provider(ProviderError::RequestFailed {
                    provider: PROVIDER_NAME.to_string(),
                    status: 0,
                    message: format!("HTTP request failed: {}", e),
                })
            })?;

        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| {
                ForemanError::Provider(ProviderError::InvalidResponse {
                    provider: PROVIDER_NAME.to_string(),
                    reason: format!("Failed to parse response: {}", e),
                })
            })
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = match serde_json::from_str::<ApiErrorBody>(&error_text) {
                Ok(body) => body.error.message,
                Err(_) => error_text,
            };

            Err(match status {
                StatusCode::TOO_MANY_REQUESTS => ForemanError::Provider(ProviderError::RateLimited {
                    provider: PROVIDER_NAME.to_string(),
                }),
                _ => ForemanError::Provider(ProviderError::RequestFailed {
                    provider: PROVIDER_NAME.to_string(),
                    status: status.as_u16() as i32,
                    message,
                }),
            })
        }
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete(&self, prompt: &str) -> ForemanResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
        };

        let response = self.post_chat(&request).await?;
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            ForemanError::Provider(ProviderError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: "Response contained no choices".to_string(),
            })
        })?;
        Ok(choice.message.content)
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAiCompletionProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompletionProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
