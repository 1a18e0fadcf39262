//! HTTP routes and the relay pipeline they drive.
//!
//! - [`webhook`] - Inbound event routes, acknowledged before any delivery work
//! - [`diagnostics`] - Health check and the synchronous end-to-end test route

mod diagnostics;
mod webhook;

use {
    crate::{
        config::Config,
        output::{compose_message, DeliveryClient, DeliveryResult, EventSummary},
    },
    axum::{
        routing::{get, post},
        Router,
    },
    serde_json::Value,
    std::{sync::Arc, time::Duration},
    tokio::task::JoinHandle,
    tokio_util::task::TaskTracker,
};

/// Shared, read-only context handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Process configuration
    pub config: Arc<Config>,
    /// Delivery client; clones share one connection pool
    pub delivery: DeliveryClient,
    /// Background relay tasks still in flight
    pub tasks: TaskTracker,
}

impl AppState {
    pub fn new(config: Config, delivery: DeliveryClient) -> Self {
        Self {
            config: Arc::new(config),
            delivery,
            tasks: TaskTracker::new(),
        }
    }

    /// Closes the task tracker and waits up to `timeout` for in-flight relay
    /// tasks to reach success or exhaustion.
    ///
    /// Returns `false` if the timeout elapsed first.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tasks.close();
        let pending = self.tasks.len();
        if pending > 0 {
            log::info!("Waiting for {pending} in-flight relay task(s)");
        }

        match tokio::time::timeout(timeout, self.tasks.wait()).await {
            Ok(()) => true,
            Err(_) => {
                log::error!(
                    "Shutdown drain timed out after {:?}; {} relay task(s) abandoned",
                    timeout,
                    self.tasks.len()
                );
                false
            }
        }
    }
}

/// Creates the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(diagnostics::healthz))
        .route("/test-slack", get(diagnostics::test_slack))
        .route("/webhook-raw", post(webhook::receive_raw))
        .route("/webhook/{event_type}", post(webhook::receive_event))
        .with_state(state)
}

/// Formats, assembles and delivers one event.
pub async fn relay_event(state: &AppState, event_type: &str, event: &Value) -> DeliveryResult {
    let config = &state.config;
    let summary = EventSummary::build(event, event_type, &config.host, config.limits.codeblock_chars);

    // Extracted descriptors are not part of the message text
    if let Some(company) = &summary.company {
        log::debug!("[{event_type}] company id={} name={}", company.id, company.name);
    }
    if let Some(user) = &summary.user {
        log::debug!(
            "[{event_type}] user id={} name={} ({:?} {:?})",
            user.id,
            user.full_name,
            user.first_name,
            user.last_name
        );
    }

    let message = compose_message(&summary, event, config.limits);
    state.delivery.send(&message).await
}

/// Runs [`relay_event`] on a tracked background task without holding up the
/// caller.
///
/// The pipeline runs inside a nested task so a panic is caught here and only
/// reaches the log.
pub fn dispatch(state: &AppState, event_type: String, event: Value) -> JoinHandle<()> {
    let tracker = state.tasks.clone();
    let state = state.clone();
    tracker.spawn(async move {
        let label = event_type.clone();
        let handle = tokio::spawn(async move {
            let result = relay_event(&state, &event_type, &event).await;
            log_outcome(&event_type, &result);
        });

        if let Err(e) = handle.await {
            log::error!("[{label}] Relay task panicked: {e}");
        }
    })
}

fn log_outcome(event_type: &str, result: &DeliveryResult) {
    match result {
        DeliveryResult::Delivered { status, .. } => {
            log::info!(
                "[{event_type}] Relayed: status={status}, attempts={}",
                result.attempts()
            );
        }
        DeliveryResult::Failed { error, .. } => {
            log::error!(
                "[{event_type}] Dropped after {} attempt(s): {error}",
                result.attempts()
            );
        }
    }
}
