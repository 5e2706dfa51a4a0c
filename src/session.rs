//! A chat conversation tying the transcript, the dispatcher and the finance
//! snapshot together.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::chat::{ChatMessage, TranscriptStore};
use crate::dispatch::{DispatchError, DispatchState, Dispatcher, SendOutcome};
use crate::snapshot::{load_snapshot, FinanceSnapshot, SnapshotStatus};

/// What happened to a submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    /// Input was blank; nothing was recorded or sent.
    Empty,
    /// A dispatch was already running; the message was not sent.
    Busy,
    /// The assistant replied.
    Reply(ChatMessage),
    /// The dispatch failed; the error was recorded as a system message.
    Failed(ChatMessage),
}

/// One conversation: an owned transcript persisted after every change.
pub struct ChatSession {
    dispatcher: Arc<Dispatcher>,
    store: TranscriptStore,
    finance_file: PathBuf,
    share_data: bool,
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    /// Opens a session, restoring the stored transcript or greeting.
    pub async fn open(
        dispatcher: Arc<Dispatcher>,
        store: TranscriptStore,
        finance_file: impl Into<PathBuf>,
        share_data: bool,
    ) -> Self {
        let messages = store.load_or_greet().await;
        Self {
            dispatcher,
            store,
            finance_file: finance_file.into(),
            share_data,
            messages,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn share_data(&self) -> bool {
        self.share_data
    }

    pub fn set_share_data(&mut self, share: bool) {
        self.share_data = share;
    }

    /// Snapshot that would be attached to the next message, if sharing is on.
    pub async fn snapshot(&self) -> Option<FinanceSnapshot> {
        if self.share_data {
            load_snapshot(&self.finance_file).await
        } else {
            None
        }
    }

    /// Status of the finance data regardless of the sharing toggle.
    pub async fn data_status(&self) -> SnapshotStatus {
        SnapshotStatus::of(load_snapshot(&self.finance_file).await.as_ref())
    }

    /// Records the user's message, dispatches the transcript and records the
    /// reply or the error.
    pub async fn submit(&mut self, input: &str) -> Result<Submitted> {
        let text = input.trim();
        if text.is_empty() {
            return Ok(Submitted::Empty);
        }
        if self.dispatcher.state() == DispatchState::Sending {
            debug!("dispatcher busy; dropping input");
            return Ok(Submitted::Busy);
        }

        self.messages.push(ChatMessage::user(text));
        self.store.save(&self.messages).await?;

        let snapshot = self.snapshot().await;
        let submitted = match self.dispatcher.send(&self.messages, snapshot.as_ref()).await {
            Ok(SendOutcome::Replied(reply)) => {
                self.messages.push(reply.clone());
                Submitted::Reply(reply)
            }
            Ok(SendOutcome::Ignored) => {
                self.messages.pop();
                Submitted::Busy
            }
            Err(err) => {
                let notice = error_notice(&err);
                self.messages.push(notice.clone());
                Submitted::Failed(notice)
            }
        };

        self.store.save(&self.messages).await?;
        Ok(submitted)
    }

    /// Clears the stored transcript and starts over.
    pub async fn clear(&mut self) -> Result<()> {
        self.messages = self.store.clear().await?;
        Ok(())
    }
}

fn error_notice(err: &DispatchError) -> ChatMessage {
    ChatMessage::system(format!("Error: {err}"))
}
