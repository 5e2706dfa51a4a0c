use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use ledgerchat::snapshot::coerce::is_truthy;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{ProxyConfig, ProxyError, Result};

/// Shared handler state.
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<ProxyConfig>,
    pub client: Client,
}

/// Body posted by clients. Messages are forwarded as-is.
#[derive(Debug, Default, Deserialize)]
pub struct ChatBody {
    #[serde(default)]
    pub messages: Vec<Value>,
    #[serde(default)]
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    temperature: f64,
}

/// System message that hands the snapshot to the model.
pub fn context_message(context: &Value) -> Value {
    let content = format!(
        "You are ledgerchat's finance assistant. Use the following JSON snapshot of the \
         user's finances (banks, assets, debts, subscriptions, ISA, totals, recentDayPL) \
         when answering.\n\nUSER_SNAPSHOT_JSON:\n{context}"
    );
    json!({"role": "system", "content": content})
}

/// POST /api/chat
/// Forwards the conversation upstream, with the snapshot as a system message
pub async fn chat(State(state): State<ProxyState>, body: Bytes) -> Result<impl IntoResponse> {
    let api_key = state.config.api_key.as_ref().ok_or(ProxyError::MissingApiKey)?;

    let body: ChatBody = if body.is_empty() {
        ChatBody::default()
    } else {
        serde_json::from_slice(&body).map_err(ProxyError::InvalidBody)?
    };

    let context = body.context.as_ref().filter(|c| is_truthy(Some(*c)));
    let mut messages = Vec::with_capacity(body.messages.len() + 1);
    if let Some(context) = context {
        messages.push(context_message(context));
    }
    tracing::debug!(
        messages = body.messages.len(),
        with_context = context.is_some(),
        "forwarding chat request"
    );
    messages.extend(body.messages);

    let request = CompletionRequest {
        model: &state.config.model,
        messages,
        temperature: state.config.temperature,
    };

    let response = state
        .client
        .post(state.config.completions_url())
        .bearer_auth(api_key.expose_secret())
        .json(&request)
        .send()
        .await?;

    let status = StatusCode::from_u16(response.status().as_u16())
        .unwrap_or(StatusCode::BAD_GATEWAY);
    let bytes = response.bytes().await?;
    let data: Value = serde_json::from_slice(&bytes).map_err(ProxyError::UpstreamBody)?;

    if !status.is_success() {
        tracing::info!(status = %status, "upstream rejected chat request");
    }

    Ok((status, Json(data)))
}

/// Any method other than POST on /api/chat
pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

/// GET /health
pub async fn health_check() -> &'static str {
    "ok"
}
