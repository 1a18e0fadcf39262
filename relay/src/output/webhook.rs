//! Webhook delivery of composed messages.
//!
//! This module posts [`OutboundMessage`]s to the configured chat webhook,
//! with retry logic and exponential backoff for reliability.

use {
    super::OutboundMessage,
    crate::{config::parse_var, error::ConfigError, error::DeliveryError},
    async_trait::async_trait,
    std::{sync::Arc, time::Duration},
};

/// Environment variable holding the outbound webhook URL.
pub const WEBHOOK_URL_VAR: &str = "SLACK_WEBHOOK_URL";

/// Configuration for webhook delivery.
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Webhook URL to POST messages to
    pub url: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Total delivery attempts, including the first one
    pub max_attempts: u32,
    /// Backoff before the second attempt; doubles after every failure
    pub retry_backoff: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl WebhookConfig {
    /// Reads the webhook settings through `lookup`.
    ///
    /// # Environment Variables
    ///
    /// - `SLACK_WEBHOOK_URL` - Required: The URL to POST messages to
    /// - `SLACK_TIMEOUT_MS` - Optional: Request timeout in ms (default: 10000)
    /// - `SLACK_MAX_RETRIES` - Optional: Total attempts (default: 3)
    /// - `SLACK_RETRY_BACKOFF_MS` - Optional: Initial backoff in ms (default: 500)
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(WEBHOOK_URL_VAR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingWebhookUrl(WEBHOOK_URL_VAR))?;

        let timeout_ms: u64 = parse_var(lookup, "SLACK_TIMEOUT_MS", 10_000);
        let max_attempts: u32 = parse_var(lookup, "SLACK_MAX_RETRIES", 3);
        let retry_backoff_ms: u64 = parse_var(lookup, "SLACK_RETRY_BACKOFF_MS", 500);

        Ok(Self {
            url,
            timeout: Duration::from_millis(timeout_ms),
            max_attempts,
            retry_backoff: Duration::from_millis(retry_backoff_ms),
        })
    }
}

/// Response of one POST, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends one JSON POST. Non-2xx statuses are returned as `Ok`; only failures
/// without a response are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, DeliveryError>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a keep-alive client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<TransportResponse, DeliveryError> {
        let resp = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::Network(format!("timed out: {e}"))
                } else {
                    DeliveryError::Network(e.to_string())
                }
            })?;

        let status = resp.status().as_u16();
        let body = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                log::debug!("Failed to read webhook response body: status={status}, err={e}");
                String::new()
            }
        };
        Ok(TransportResponse { status, body })
    }
}

/// Outcome of a full delivery sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The endpoint answered 2xx
    Delivered {
        status: u16,
        body: String,
        attempts: u32,
    },
    /// Every attempt failed; carries the last error
    Failed { error: DeliveryError, attempts: u32 },
}

impl DeliveryResult {
    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Delivered { attempts, .. } | Self::Failed { attempts, .. } => *attempts,
        }
    }
}

/// Delivers messages to the configured webhook with bounded retries.
///
/// Cheap to clone; clones share the underlying connection pool.
///
/// # Example
///
/// ```ignore
/// let client = DeliveryClient::new(config)?;
/// match client.send(&message).await {
///     DeliveryResult::Delivered { status, .. } => log::info!("sent: {status}"),
///     DeliveryResult::Failed { error, .. } => log::error!("dropped: {error}"),
/// }
/// ```
#[derive(Clone)]
pub struct DeliveryClient {
    transport: Arc<dyn Transport>,
    config: Arc<WebhookConfig>,
}

impl DeliveryClient {
    /// Creates a client that posts over HTTP(S).
    pub fn new(config: WebhookConfig) -> Result<Self, reqwest::Error> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: WebhookConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: Arc::new(config),
        }
    }

    /// Posts `message`, retrying with exponential backoff until a 2xx answer
    /// or until `max_attempts` attempts have been made.
    pub async fn send(&self, message: &OutboundMessage) -> DeliveryResult {
        let max_attempts = self.config.max_attempts.max(1);

        // Encoding failures go through the same attempt accounting as any other error
        let body = serde_json::to_vec(message)
            .map_err(|e| DeliveryError::Other(format!("failed to encode message: {e}")));

        let mut attempt = 0;
        let mut backoff = self.config.retry_backoff;

        loop {
            attempt += 1;

            let outcome = match &body {
                Ok(bytes) => self.transport.post_json(&self.config.url, bytes.clone()).await,
                Err(e) => Err(e.clone()),
            };

            let error = match outcome {
                Ok(resp) if (200..300).contains(&resp.status) => {
                    log::debug!(
                        "Webhook delivered: status={}, attempt={}/{}",
                        resp.status,
                        attempt,
                        max_attempts
                    );
                    return DeliveryResult::Delivered {
                        status: resp.status,
                        body: resp.body,
                        attempts: attempt,
                    };
                }
                Ok(resp) => DeliveryError::Http {
                    status: resp.status,
                    body: resp.body,
                },
                Err(e) => e,
            };

            log::warn!(
                "Webhook {} failure: err={}, attempt={}/{}",
                error.kind(),
                error,
                attempt,
                max_attempts
            );

            if attempt >= max_attempts {
                log::error!("Webhook delivery failed after {} attempts: {}", attempt, error);
                return DeliveryResult::Failed {
                    error,
                    attempts: attempt,
                };
            }

            // Exponential backoff
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }
    }
}
