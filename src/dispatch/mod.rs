//! Sending a transcript to the chat endpoint.
//!
//! A dispatch is a two-step pipeline:
//!
//! 1. post `{messages, context}` to the endpoint;
//! 2. if that is rejected and a snapshot was attached, post once more with
//!    the snapshot inlined as a leading system message and no `context`
//!    field, for endpoints that do not understand `context`.
//!
//! There is no further retry. At most one dispatch runs at a time per
//! [`Dispatcher`]; a call made while another is in flight is ignored.

mod error;
mod transport;

pub use error::DispatchError;
pub use transport::{ChatRequest, ChatTransport, EndpointResponse, HttpTransport, TransportError};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::chat::ChatMessage;
use crate::snapshot::FinanceSnapshot;

/// Reply used when the endpoint accepts a request but returns no content.
pub const NO_RESPONSE: &str = "[No response]";

/// Rejection message used when the endpoint gives no `error.message`.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Result of a [`Dispatcher::send`] call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant's reply.
    Replied(ChatMessage),
    /// Another dispatch was in flight; nothing was sent.
    Ignored,
}

/// Dispatcher lifecycle. `Sending` spans both attempts of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Sending,
}

/// Owns the in-flight flag and the transport used to reach the endpoint.
pub struct Dispatcher {
    transport: Arc<dyn ChatTransport>,
    in_flight: AtomicBool,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self {
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Dispatcher posting to `url` over HTTP.
    pub fn http(url: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpTransport::new(url)))
    }

    pub fn state(&self) -> DispatchState {
        if self.in_flight.load(Ordering::Acquire) {
            DispatchState::Sending
        } else {
            DispatchState::Idle
        }
    }

    /// Sends the transcript, optionally with a snapshot, and returns the
    /// assistant's reply.
    pub async fn send(
        &self,
        transcript: &[ChatMessage],
        snapshot: Option<&FinanceSnapshot>,
    ) -> Result<SendOutcome, DispatchError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            debug!("dispatch already in flight; ignoring send");
            return Ok(SendOutcome::Ignored);
        };

        debug!(
            messages = transcript.len(),
            with_snapshot = snapshot.is_some(),
            "sending chat request"
        );
        let primary = ChatRequest::primary(transcript, snapshot);
        let response = self.transport.post(&primary).await?;
        if response.is_success() {
            return Ok(SendOutcome::Replied(reply_from(&response.body)));
        }

        let Some(snapshot) = snapshot else {
            info!(status = response.status, "chat request rejected");
            return Err(DispatchError::Rejected {
                status: response.status,
                message: rejection_message(&response.body),
            });
        };

        warn!(
            status = response.status,
            "chat request rejected; retrying with snapshot inlined"
        );
        let fallback = ChatRequest::inlined(transcript, snapshot)?;
        let response = self.transport.post(&fallback).await?;
        if response.is_success() {
            return Ok(SendOutcome::Replied(reply_from(&response.body)));
        }

        info!(status = response.status, "inlined chat request rejected");
        Err(DispatchError::FallbackRejected {
            status: response.status,
            payload: response.body.to_string(),
        })
    }
}

/// Holds the in-flight flag for the duration of one dispatch and releases it
/// on drop, whatever the exit path.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Extracts `choices[0].message.content` from a completion body.
pub fn reply_from(body: &Value) -> ChatMessage {
    let content = body
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(NO_RESPONSE);
    ChatMessage::assistant(content)
}

/// Human-readable message for a rejected request.
pub fn rejection_message(body: &Value) -> String {
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(GENERIC_FAILURE)
        .to_string()
}
