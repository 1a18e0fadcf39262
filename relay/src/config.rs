//! Configuration module for parsing environment variables.
//!
//! Everything is read once at startup into a [`Config`] that is shared
//! read-only for the lifetime of the process.

use {
    crate::{
        error::ConfigError,
        output::{MessageLimits, WebhookConfig},
    },
    std::{env, fs, str::FromStr},
};

/// Default per code block character ceiling.
pub const DEFAULT_CODEBLOCK_CHAR_LIMIT: usize = 2800;

/// Default ceiling on the serialized outbound message.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 38_000;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Process-wide settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Outbound delivery settings
    pub webhook: WebhookConfig,
    /// Size ceilings for composed messages
    pub limits: MessageLimits,
    /// TCP port the HTTP server listens on
    pub port: u16,
    /// Identifier of this host, shown in every summary
    pub host: String,
}

impl Config {
    /// Loads the configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SLACK_WEBHOOK_URL` - Required: outbound chat webhook
    /// - `SLACK_TIMEOUT_MS` - Optional: per-attempt timeout (default: 10000)
    /// - `SLACK_MAX_RETRIES` - Optional: total delivery attempts (default: 3)
    /// - `SLACK_RETRY_BACKOFF_MS` - Optional: initial backoff (default: 500)
    /// - `SLACK_CODEBLOCK_CHAR_LIMIT` - Optional: code block ceiling (default: 2800)
    /// - `SLACK_MAX_MESSAGE_BYTES` - Optional: message ceiling (default: 38000)
    /// - `PORT` - Optional: listen port (default: 3000)
    /// - `HOST_LABEL` - Optional: host identifier override
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingWebhookUrl`] when the webhook URL is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let webhook = WebhookConfig::from_lookup(&lookup)?;

        Ok(Self {
            webhook,
            limits: MessageLimits {
                codeblock_chars: parse_var(
                    &lookup,
                    "SLACK_CODEBLOCK_CHAR_LIMIT",
                    DEFAULT_CODEBLOCK_CHAR_LIMIT,
                ),
                message_bytes: parse_var(
                    &lookup,
                    "SLACK_MAX_MESSAGE_BYTES",
                    DEFAULT_MAX_MESSAGE_BYTES,
                ),
            },
            port: parse_var(&lookup, "PORT", DEFAULT_PORT),
            host: resolve_host_identifier(&lookup),
        })
    }
}

/// Parses `key` into `T`, falling back to `default` when unset, blank or invalid.
pub(crate) fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return default;
    }
    match trimmed.parse() {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Invalid value '{}' for {}: {}; using default", trimmed, key, e);
            default
        }
    }
}

/// Resolves the host identifier: `HOST_LABEL`, then `HOSTNAME`, then
/// `/etc/hostname`, then `"unknown"`.
pub fn resolve_host_identifier<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["HOST_LABEL", "HOSTNAME"]
        .iter()
        .filter_map(|key| lookup(*key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .or_else(|| {
            fs::read_to_string("/etc/hostname")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
