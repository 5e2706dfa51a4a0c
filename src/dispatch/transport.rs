use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::chat::ChatMessage;
use crate::snapshot::FinanceSnapshot;

/// Request body accepted by the chat endpoint.
///
/// `context` is `Some(None)` to send an explicit `null`, and `None` to leave
/// the field out entirely (the inlined fallback).
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Option<&'a FinanceSnapshot>>,
}

impl<'a> ChatRequest<'a> {
    /// Transcript plus the snapshot in the dedicated `context` field.
    pub fn primary(transcript: &[ChatMessage], snapshot: Option<&'a FinanceSnapshot>) -> Self {
        Self {
            messages: transcript.to_vec(),
            context: Some(snapshot),
        }
    }

    /// Transcript preceded by a system message carrying the snapshot as text.
    pub fn inlined(
        transcript: &[ChatMessage],
        snapshot: &FinanceSnapshot,
    ) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(snapshot)?;
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(ChatMessage::system(format!(
            "You are ledgerchat's finance assistant.\n\
             Here is the user's snapshot JSON for this session:\n\n{json}"
        )));
        messages.extend_from_slice(transcript);
        Ok(Self {
            messages,
            context: None,
        })
    }
}

/// Status and decoded body of an endpoint response.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Value,
}

impl EndpointResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON in response (status {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

/// Carries a chat request to the endpoint and back.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post(&self, request: &ChatRequest<'_>) -> Result<EndpointResponse, TransportError>;
}

/// HTTP transport posting JSON to a single endpoint URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post(&self, request: &ChatRequest<'_>) -> Result<EndpointResponse, TransportError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        // The body is decoded before the status is looked at, so a non-JSON
        // body is a transport failure even on a rejection.
        let body = serde_json::from_str::<Value>(&text)
            .map_err(|source| TransportError::Decode { status, source })?;

        Ok(EndpointResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::snapshot_from_json;
    use serde_json::json;

    #[test]
    fn test_primary_without_snapshot_sends_null_context() {
        let transcript = vec![ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest::primary(&transcript, None)).unwrap();
        assert_eq!(
            body,
            json!({"messages": [{"role": "user", "content": "hi"}], "context": null})
        );
    }

    #[test]
    fn test_primary_with_snapshot_sends_context() {
        let snapshot = snapshot_from_json(r#"{"currency": "USD"}"#).unwrap();
        let transcript = vec![ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest::primary(&transcript, Some(&snapshot))).unwrap();
        assert_eq!(body["context"]["currency"], "USD");
    }

    #[test]
    fn test_inlined_prepends_system_message_and_omits_context() {
        let snapshot = snapshot_from_json(r#"{"currency": "USD"}"#).unwrap();
        let transcript = vec![ChatMessage::user("hi")];
        let request = ChatRequest::inlined(&transcript, &snapshot).unwrap();

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1], transcript[0]);
        assert!(request.messages[0].content.contains(r#""currency":"USD""#));

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("context").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn test_success_range() {
        let ok = EndpointResponse {
            status: 204,
            body: Value::Null,
        };
        let rejected = EndpointResponse {
            status: 400,
            body: Value::Null,
        };
        assert!(ok.is_success());
        assert!(!rejected.is_success());
    }
}
