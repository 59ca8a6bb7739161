//! Shared HTTP client for all Z.ai calls.

use std::sync::Arc;
use std::time::Duration;

use crate::{ClientConfig, Error, Result};

/// Deadline for the anonymous auth call.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for the live model list fetch.
pub const MODELS_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for the chat completion call.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// One-shot request issuer for the Z.ai API.
///
/// Holds no per-call state: every method builds its headers, token and
/// signature fresh. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ZaiClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<ClientConfig>,
}

impl ZaiClient {
    /// Create a client with a default reqwest client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Create a client reusing an existing reqwest client.
    pub fn with_http_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Pass 2xx responses through; turn anything else into `Error::UpstreamStatus`.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::UpstreamStatus {
        status: status.as_u16(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_wraps_config() {
        let client = ZaiClient::new(ClientConfig {
            anonymous_mode: false,
            ..Default::default()
        });
        assert!(!client.config().anonymous_mode);
        assert_eq!(client.config().origin(), "https://chat.z.ai");
    }

    #[test]
    fn clones_share_config() {
        let client = ZaiClient::new(ClientConfig::default());
        let clone = client.clone();
        assert!(Arc::ptr_eq(&client.config, &clone.config));
    }

    #[test]
    fn timeouts_match_call_sites() {
        assert_eq!(AUTH_TIMEOUT, Duration::from_secs(10));
        assert_eq!(MODELS_TIMEOUT, Duration::from_secs(10));
        assert_eq!(CHAT_TIMEOUT, Duration::from_secs(60));
    }
}
