use {
    anyhow::Context,
    config::Config,
    handlers::{create_router, AppState},
    output::DeliveryClient,
    std::{net::SocketAddr, time::Duration},
};

mod config;
mod error;
mod handlers;
mod output;

/// Upper bound on waiting for in-flight deliveries at shutdown.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            log::error!("Configuration error: {e}");
            return Err(e.into());
        }
    };

    // Never log the full webhook URL, it embeds the secret path
    let webhook_host = reqwest::Url::parse(&config.webhook.url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "<unparsable>".to_string());
    log::info!(
        "Webhook: host={}, timeout={:?}, attempts={}, backoff={:?}",
        webhook_host,
        config.webhook.timeout,
        config.webhook.max_attempts,
        config.webhook.retry_backoff
    );
    log::info!(
        "Limits: codeblock={} chars, message={} bytes",
        config.limits.codeblock_chars,
        config.limits.message_bytes
    );
    log::info!("Host identifier: {}", config.host);

    let delivery =
        DeliveryClient::new(config.webhook.clone()).context("failed to build HTTP client")?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config, delivery);
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Deliveries already dispatched run to success or exhaustion
    state.drain(SHUTDOWN_DRAIN_TIMEOUT).await;

    log::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Received shutdown signal");
}
