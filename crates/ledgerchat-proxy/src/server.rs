use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::TcpListener;

use crate::{router::create_router, ProxyConfig};

/// Run the proxy until the listener fails or the process is interrupted.
pub async fn run_server(config: ProxyConfig, host: &str, port: u16) -> anyhow::Result<()> {
    if config.api_key.is_none() {
        tracing::warn!("No API key configured; chat requests will be refused");
    }

    let app = create_router(config);

    let addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid listen address: {host}:{port}"))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Chat proxy listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
