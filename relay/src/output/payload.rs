//! Assembly of the outbound chat message.
//!
//! The message is the rendered summary followed by the raw event embedded as a
//! fenced JSON block. Two limits apply: the per-block character ceiling used by
//! [`serialize_bounded`], and a total byte ceiling on the serialized message.
//! When the latter is exceeded the payload block is swapped for a placeholder.

use {
    super::{
        summary::EventSummary,
        truncate::{sanitize_code_fence, serialize_bounded},
    },
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// Heading that introduces the embedded raw payload.
pub const PAYLOAD_HEADING: &str = "*Payload:*";

/// Stands in for the payload block when the message is over the byte ceiling.
pub const PAYLOAD_PLACEHOLDER: &str = "... (payload truncated due to size) ...";

/// Size limits applied while composing a message.
#[derive(Debug, Clone, Copy)]
pub struct MessageLimits {
    /// Maximum characters inside one embedded code block
    pub codeblock_chars: usize,
    /// Maximum serialized size of the whole message
    pub message_bytes: usize,
}

/// Message body posted to the chat webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
}

impl OutboundMessage {
    /// Serialized size in bytes. Falls back to the text length, which
    /// under-counts only by the JSON framing.
    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self)
            .map(|bytes| bytes.len())
            .unwrap_or_else(|_| self.text.len())
    }
}

/// Composes the outbound message for `event` from its rendered summary.
///
/// Never fails; oversized content is degraded instead.
///
/// # Arguments
///
/// * `summary` - Summary built from the same event
/// * `event` - The raw inbound payload to embed
/// * `limits` - Code block and total size ceilings
pub fn compose_message(summary: &EventSummary, event: &Value, limits: MessageLimits) -> OutboundMessage {
    let summary_text = summary.render();
    let payload = sanitize_code_fence(&serialize_bounded(event, limits.codeblock_chars));

    let message = OutboundMessage {
        text: with_payload_block(&summary_text, &format!("```json\n{payload}\n```")),
        attachments: summary.attachments.clone(),
    };

    let size = message.encoded_len();
    if size <= limits.message_bytes {
        return message;
    }

    let degraded = OutboundMessage {
        text: with_payload_block(&summary_text, &format!("```\n{PAYLOAD_PLACEHOLDER}\n```")),
        ..message
    };
    log::warn!(
        "Message for event '{}' is {} bytes (limit {}), payload replaced: now {} bytes",
        summary.event_type,
        size,
        limits.message_bytes,
        degraded.encoded_len()
    );
    degraded
}

fn with_payload_block(summary_text: &str, block: &str) -> String {
    format!("{summary_text}\n\n{PAYLOAD_HEADING}\n{block}")
}

#[cfg(test)]
mod tests {
    use {super::*, serde_json::json};

    const LIMITS: MessageLimits = MessageLimits {
        codeblock_chars: 2800,
        message_bytes: 38_000,
    };

    fn summary_for(event: &Value) -> EventSummary {
        EventSummary::build(event, "vue-completed", "relay-01", LIMITS.codeblock_chars)
    }

    #[test]
    fn test_compose_embeds_payload() {
        let event = json!({"company": {"id": 1, "name": "X"}});
        let summary = summary_for(&event);
        let message = compose_message(&summary, &event, LIMITS);

        assert!(message.text.starts_with(&summary.render()));
        assert!(message.text.contains("*Payload:*\n```json\n{"));
        assert!(message.text.contains("\"name\": \"X\""));
        assert!(message.text.ends_with("\n```"));
        assert!(message.attachments.is_none());
    }

    #[test]
    fn test_attachments_pass_through() {
        let event = json!({});
        let summary = summary_for(&event).with_attachments(json!([{"color": "good"}]));
        let message = compose_message(&summary, &event, LIMITS);

        assert_eq!(message.attachments, Some(json!([{"color": "good"}])));
        let wire = serde_json::to_value(&message).unwrap();
        assert_eq!(wire["attachments"][0]["color"], "good");
    }

    #[test]
    fn test_attachments_omitted_on_wire() {
        let message = OutboundMessage {
            text: "hi".to_string(),
            attachments: None,
        };
        assert_eq!(serde_json::to_string(&message).unwrap(), r#"{"text":"hi"}"#);
        assert_eq!(message.encoded_len(), 13);
    }

    #[test]
    fn test_oversized_payload_replaced() {
        let event = json!({
            "additional_info": {"req": {"url": "https://example.com/hook"}},
            "blob": "w".repeat(5000)
        });
        let limits = MessageLimits {
            codeblock_chars: 10_000,
            message_bytes: 1_000,
        };
        let summary = summary_for(&event);
        let message = compose_message(&summary, &event, limits);

        assert!(message.text.starts_with(&summary.render()));
        assert!(message.text.contains("*URL:* https://example.com/hook"));
        assert!(message.text.contains(PAYLOAD_PLACEHOLDER));
        assert!(!message.text.contains("www"));
        assert!(message.encoded_len() <= limits.message_bytes);
    }

    #[test]
    fn test_codeblock_limit_applies_before_byte_ceiling() {
        let event = json!({"blob": "k".repeat(5000)});
        let limits = MessageLimits {
            codeblock_chars: 500,
            message_bytes: 38_000,
        };
        let message = compose_message(&summary_for(&event), &event, limits);

        assert!(message.text.contains("... (truncated) ..."));
        assert!(!message.text.contains(PAYLOAD_PLACEHOLDER));
    }

    #[test]
    fn test_payload_fences_sanitized() {
        let event = json!({"md": "```rust\nfn main() {}\n```"});
        let message = compose_message(&summary_for(&event), &event, LIMITS);

        assert_eq!(message.text.matches("```").count(), 2);
    }
}
