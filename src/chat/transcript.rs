use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::warn;

use super::ChatMessage;

/// Opening message for a fresh conversation.
pub const GREETING: &str = "Hi! I'm your ledgerchat helper.
Ask about budgeting, subscriptions, ISA math, or your balances and assets.
Use --share (or /share in chat) if you want me to use your numbers.";

/// Opening message after the transcript has been cleared.
pub const CLEARED_GREETING: &str = "Cleared. How can I help?";

/// JSON-file transcript persistence.
///
/// The file holds a single array of `{role, content}` objects. Reads are
/// best-effort: a missing or unparsable file is an empty transcript.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Vec<ChatMessage> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read transcript");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unparsable transcript");
                Vec::new()
            }
        }
    }

    /// Loads the transcript, seeding it with the greeting when empty.
    pub async fn load_or_greet(&self) -> Vec<ChatMessage> {
        let messages = self.load().await;
        if messages.is_empty() {
            vec![ChatMessage::assistant(GREETING)]
        } else {
            messages
        }
    }

    pub async fn save(&self, messages: &[ChatMessage]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create transcript directory")?;
        }
        let content = serde_json::to_string(messages).context("Failed to serialize transcript")?;
        fs::write(&self.path, content)
            .await
            .with_context(|| format!("Failed to write transcript: {}", self.path.display()))?;
        Ok(())
    }

    /// Removes the stored transcript and returns the fresh one to display.
    pub async fn clear(&self) -> Result<Vec<ChatMessage>> {
        match fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to remove transcript: {}", self.path.display())
                })
            }
        }
        Ok(vec![ChatMessage::assistant(CLEARED_GREETING)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load() -> Result<()> {
        let dir = TempDir::new()?;
        let store = TranscriptStore::new(dir.path().join("nested").join("chat.json"));
        let messages = vec![
            ChatMessage::user("How much do I spend on subscriptions?"),
            ChatMessage::assistant("About 40 a month."),
        ];

        store.save(&messages).await?;
        assert_eq!(store.load().await, messages);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_greets() -> Result<()> {
        let dir = TempDir::new()?;
        let store = TranscriptStore::new(dir.path().join("chat.json"));

        assert!(store.load().await.is_empty());
        let greeted = store.load_or_greet().await;
        assert_eq!(greeted.len(), 1);
        assert_eq!(greeted[0].role, Role::Assistant);
        assert_eq!(greeted[0].content, GREETING);
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("chat.json");
        std::fs::write(&path, "[{\"role\": \"user\"")?;

        let store = TranscriptStore::new(&path);
        assert!(store.load().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_removes_file() -> Result<()> {
        let dir = TempDir::new()?;
        let store = TranscriptStore::new(dir.path().join("chat.json"));
        store.save(&[ChatMessage::user("hello")]).await?;

        let fresh = store.clear().await?;
        assert_eq!(fresh, vec![ChatMessage::assistant(CLEARED_GREETING)]);
        assert!(!store.path().exists());

        // Clearing twice is fine.
        store.clear().await?;
        Ok(())
    }
}
