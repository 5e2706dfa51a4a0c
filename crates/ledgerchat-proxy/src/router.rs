use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use reqwest::Client;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, ProxyState};
use crate::ProxyConfig;

/// Create the proxy router.
pub fn create_router(config: ProxyConfig) -> Router {
    create_router_with_client(config, Client::new())
}

/// Create the proxy router with a caller-supplied HTTP client.
pub fn create_router_with_client(config: ProxyConfig, client: Client) -> Router {
    let state = ProxyState {
        config: Arc::new(config),
        client,
    };

    Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/api/chat",
            post(handlers::chat).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
