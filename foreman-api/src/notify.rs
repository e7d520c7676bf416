//! Webhook escalation notifier.
//!
//! Posts the escalation notice as JSON with an HMAC-SHA256 signature header
//! so receivers can authenticate the sender. Delivery failures surface as
//! provider errors; the dispatcher logs them and moves on.

use foreman_core::{ForemanError, ForemanResult, ProviderError};
use foreman_engine::{EscalationNotice, Notifier};
use hmac::{Hmac, Mac};
use reqwest::Client;
use sha2::Sha256;
use std::time::Duration;

type HmacSha256 = Hmac<Sha256>;

const PROVIDER_NAME: &str = "webhook";
const SIGNATURE_HEADER: &str = "x-foreman-signature";
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notifier that POSTs escalation notices to a configured endpoint.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    secret: Option<String>,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(DELIVERY_TIMEOUT)
                .build()
                .unwrap_or_default(),
            url: url.into(),
            secret: None,
        }
    }

    /// Sign deliveries with a shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    fn sign(&self, body: &[u8]) -> Option<String> {
        let secret = self.secret.as_ref()?;
        // Key length is unrestricted for HMAC
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &EscalationNotice) -> ForemanResult<()> {
        let body = serde_json::to_vec(notice).map_err(|e| {
            ForemanError::Provider(ProviderError::InvalidResponse {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("serialization failed: {}", e),
            })
        })?;

        let mut request = self
            .client
            .post(&self.url)
            .header("content-type", "application/json")
            .body(body.clone());
        if let Some(signature) = self.sign(&body) {
            request = request.header(SIGNATURE_HEADER, signature);
        }

        let response = request.send().await.map_err(|e| {
            ForemanError::Provider(ProviderError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                status: 0,
                message: format!("HTTP request failed: {}", e),
            })
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ForemanError::Provider(ProviderError::RequestFailed {
                provider: PROVIDER_NAME.to_string(),
                status: status.as_u16() as i32,
                message: format!("webhook returned {}", status),
            }))
        }
    }
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.url)
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
