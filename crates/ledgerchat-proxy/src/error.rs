use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProxyError>;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Use POST")]
    MethodNotAllowed,

    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,

    #[error("Invalid request body: {0}")]
    InvalidBody(#[source] serde_json::Error),

    #[error("Upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("Upstream returned invalid JSON: {0}")]
    UpstreamBody(#[source] serde_json::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ProxyError::MissingApiKey
            | ProxyError::Upstream(_)
            | ProxyError::UpstreamBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "chat proxy failed");
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
