//! Human-readable summary of an inbound webhook event.
//!
//! The inbound payload has no fixed schema, so every field is read through
//! `Value::pointer` with an explicit presence check. Missing fields simply drop
//! their block from the rendered text.

use {
    super::truncate::{sanitize_code_fence, serialize_bounded},
    serde::Serialize,
    serde_json::Value,
};

/// First line of every relayed message.
pub const BANNER: &str = ":bell: *New webhook event received*";

/// Fallback for descriptor names that the event does not carry.
const NOT_AVAILABLE: &str = "N/A";

/// Separator between rendered blocks.
const BLOCK_SEPARATOR: &str = "\n\n";

/// Company descriptor pulled from `company` when it carries an `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyInfo {
    pub id: Value,
    pub name: String,
}

/// User descriptor pulled from `user` when it carries an `id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfo {
    pub id: Value,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
}

/// Fixed-layout summary of one inbound event.
///
/// `company` and `user` are extracted for callers but are not part of the
/// rendered text.
#[derive(Debug, Clone, Default)]
pub struct EventSummary {
    /// `additional_info.req.url`
    pub url: Option<String>,
    /// `additional_info.req.method`
    pub method: Option<String>,
    /// Bounded pretty JSON of `additional_info.req.body`
    pub body_json: Option<String>,
    /// Host identifier of this relay process
    pub host: String,
    /// Event-type label taken from the route
    pub event_type: String,
    pub company: Option<CompanyInfo>,
    pub user: Option<UserInfo>,
    /// Passed through untouched into the outbound message
    pub attachments: Option<Value>,
}

impl EventSummary {
    /// Builds the summary for `event`.
    ///
    /// # Arguments
    ///
    /// * `event` - The raw inbound payload
    /// * `event_type` - Label of the route the event arrived on
    /// * `host` - Host identifier resolved at startup
    /// * `codeblock_char_limit` - Character ceiling for the embedded request body
    pub fn build(event: &Value, event_type: &str, host: &str, codeblock_char_limit: usize) -> Self {
        let req = event.pointer("/additional_info/req");

        Self {
            url: req.and_then(|r| r.get("url")).and_then(value_text),
            method: req.and_then(|r| r.get("method")).and_then(value_text),
            body_json: req
                .and_then(|r| r.get("body"))
                .filter(|body| !body.is_null())
                .map(|body| serialize_bounded(body, codeblock_char_limit)),
            host: host.to_string(),
            event_type: event_type.to_string(),
            company: extract_company(event),
            user: extract_user(event),
            attachments: None,
        }
    }

    /// Attaches an opaque value forwarded as the message `attachments`.
    #[cfg(test)]
    pub fn with_attachments(mut self, attachments: Value) -> Self {
        self.attachments = Some(attachments);
        self
    }

    /// Returns the text blocks in display order.
    pub fn blocks(&self) -> Vec<String> {
        let mut blocks = vec![BANNER.to_string()];

        if let Some(url) = &self.url {
            blocks.push(format!("*URL:* {url}"));
        }
        if let Some(method) = &self.method {
            blocks.push(format!("*Method:* `{method}`"));
        }
        if let Some(body) = &self.body_json {
            blocks.push(format!(
                "*Body:*\n```json\n{}\n```",
                sanitize_code_fence(body)
            ));
        }
        blocks.push(format!("*Host:* `{}`", self.host));
        blocks.push(format!("*Event:* `{}`", self.event_type));

        blocks
    }

    /// Renders the blocks into a single string separated by blank lines.
    pub fn render(&self) -> String {
        self.blocks().join(BLOCK_SEPARATOR)
    }
}

/// Reads a scalar as display text. Null and empty strings count as absent.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text_or_na(value: Option<&Value>) -> String {
    value
        .and_then(value_text)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn present_id(value: &Value) -> Option<Value> {
    value.get("id").filter(|id| !id.is_null()).cloned()
}

fn extract_company(event: &Value) -> Option<CompanyInfo> {
    let company = event.get("company")?;
    let id = present_id(company)?;

    Some(CompanyInfo {
        id,
        name: text_or_na(company.get("name")),
    })
}

fn extract_user(event: &Value) -> Option<UserInfo> {
    let user = event.get("user")?;
    let id = present_id(user)?;

    Some(UserInfo {
        id,
        first_name: user.get("first_name").and_then(value_text),
        last_name: user.get("last_name").and_then(value_text),
        full_name: text_or_na(user.get("full_name")),
    })
}
