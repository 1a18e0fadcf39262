//! Health check and end-to-end test routes.

use {
    super::{relay_event, AppState},
    crate::output::DeliveryResult,
    axum::{extract::State, http::StatusCode, Json},
    serde_json::{json, Value},
};

/// Event type label used by the test route.
const TEST_EVENT_TYPE: &str = "test-slack";

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

/// `GET /test-slack`
///
/// Runs a fixed sample event through the whole pipeline and reports the
/// delivery outcome to the caller.
pub async fn test_slack(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match relay_event(&state, TEST_EVENT_TYPE, &sample_event()).await {
        DeliveryResult::Delivered { status, .. } => {
            log::info!("[{TEST_EVENT_TYPE}] Test message delivered: status={status}");
            (StatusCode::OK, Json(json!({"ok": true, "status": status})))
        }
        DeliveryResult::Failed { error, attempts } => {
            log::error!("[{TEST_EVENT_TYPE}] Test message failed after {attempts} attempt(s): {error}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"ok": false, "error": error.to_string()})),
            )
        }
    }
}

fn sample_event() -> Value {
    json!({
        "event": "test",
        "message": "Test notification from webhook-relay",
        "additional_info": {
            "req": {
                "url": "https://example.com/api/test",
                "method": "POST",
                "body": {"hello": "world"}
            }
        },
        "company": {"id": 0, "name": "Example Co"},
        "user": {"id": 0, "first_name": "Test", "last_name": "User", "full_name": "Test User"}
    })
}
