//! Error types for configuration and delivery.

use thiserror::Error;

/// Startup configuration problems. Any of these stops the process before it
/// accepts traffic.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; refusing to start without an outbound webhook")]
    MissingWebhookUrl(&'static str),
}

/// A single failed delivery attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Connection, TLS or timeout failure before a response arrived
    #[error("network error: {0}")]
    Network(String),

    /// The endpoint answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Anything else, e.g. the message could not be encoded
    #[error("{0}")]
    Other(String),
}

impl DeliveryError {
    /// Short label of the failure branch, used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Http { .. } => "http",
            Self::Other(_) => "other",
        }
    }
}
