//! Inbound webhook routes.

use {
    super::{dispatch, AppState},
    crate::output::truncate::truncate_text,
    axum::{
        body::Bytes,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        Json,
    },
    serde_json::{json, Value},
};

/// Characters of a raw body echoed into the debug log.
const RAW_PREVIEW_CHARS: usize = 500;

fn accepted() -> (StatusCode, Json<Value>) {
    (StatusCode::ACCEPTED, Json(json!({"status": "accepted"})))
}

/// `POST /webhook/{event_type}`
///
/// Acknowledges at once and relays the event on a background task. The body
/// only has to parse as JSON; the content type is not checked.
pub async fn receive_event(
    State(state): State<AppState>,
    Path(event_type): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let event: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("[{event_type}] Rejected unparsable body ({} bytes): {e}", body.len());
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "rejected", "error": e.to_string()})),
            );
        }
    };

    log::info!("[{event_type}] Webhook received");
    dispatch(&state, event_type, event);
    accepted()
}

/// `POST /webhook-raw`
///
/// Logs the request as received and acknowledges it. Nothing is relayed.
pub async fn receive_raw(headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");
    log::info!(
        "[raw] Webhook received: content_type={}, headers={}, bytes={}",
        content_type,
        headers.len(),
        body.len()
    );
    log::debug!(
        "[raw] Body: {}",
        truncate_text(&String::from_utf8_lossy(&body), RAW_PREVIEW_CHARS)
    );
    accepted()
}
