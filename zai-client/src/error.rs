//! Error types for Z.ai request shaping and upstream calls.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the Z.ai API.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure (connect, TLS, body read).
    #[error("request failed: {0}")]
    Request(String),

    /// The call exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream answered outside the 2xx range.
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Anonymous auth response had no usable token.
    #[error("anonymous auth response contained no token")]
    MissingToken,

    /// A header name or value could not be encoded.
    #[error("invalid header {0}")]
    InvalidHeader(String),

    /// A configured URL could not be parsed.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Credentials not found in keyring or environment.
    #[error("credentials not found: {0}")]
    CredentialsNotFound(String),

    /// Failed to access system keyring.
    #[error("keyring error: {0}")]
    Keyring(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Classify a reqwest error, keeping timeouts distinct from other transport failures.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else {
            Self::Request(err.to_string())
        }
    }

    /// Whether the failure came from the upstream service rather than the transport.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamStatus { .. } | Self::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = Error::UpstreamStatus {
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned 403: forbidden");
    }

    #[test]
    fn timeout_display_includes_duration() {
        let err = Error::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "request timed out after 10s");
    }

    #[test]
    fn error_from_serde_json() {
        let json_err: serde_json::Error = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn upstream_classification() {
        assert!(Error::MissingToken.is_upstream());
        assert!(!Error::Request("reset".into()).is_upstream());
    }
}
