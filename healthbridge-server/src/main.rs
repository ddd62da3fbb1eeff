use anyhow::Context;
use healthbridge_server::telemetry::init_tracing;
use healthbridge_server::{ServerConfig, create_app};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();
    init_tracing(config.log_format);

    let app = create_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(
        log_format = ?config.log_format,
        "HealthBridge API listening on {} (grant ttl {}s)",
        addr,
        config.grant_ttl.as_secs()
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
