//! HTTP proxy between ledgerchat clients and a chat-completions API.
//!
//! Clients post `{messages, context}` to `/api/chat`. When a finance
//! snapshot is supplied in `context`, the proxy prepends it to the
//! conversation as a system message, attaches the API credential and
//! forwards the request upstream. Upstream status and body are passed
//! back verbatim.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;

pub use error::{ProxyError, Result};
pub use router::create_router;
pub use server::run_server;

use secrecy::SecretString;

/// Default upstream API base URL.
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com";

/// Default model used for completions.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Upstream settings for the proxy.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base URL of the chat-completions API, without the `/v1/...` path.
    pub upstream_url: String,
    pub model: String,
    pub temperature: f64,
    /// API credential. Requests are refused while this is unset.
    pub api_key: Option<SecretString>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
        }
    }
}

impl ProxyConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_upstream_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_url = url.into();
        self
    }

    pub fn completions_url(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.upstream_url.trim_end_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let config = ProxyConfig::default().with_upstream_url("http://localhost:9000/");
        assert_eq!(
            config.completions_url(),
            "http://localhost:9000/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_config_has_no_key() {
        let config = ProxyConfig::default();
        assert!(config.api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.completions_url(), "https://api.openai.com/v1/chat/completions");
    }
}
