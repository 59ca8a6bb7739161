//! Bearer token acquisition.
//!
//! Two paths produce a token:
//!
//! 1. [`ZaiClient::anonymous_token`] asks the provider's auth endpoint for a
//!    fresh guest token. It fails loudly.
//! 2. [`ZaiClient::auth_token`] wraps the first path when anonymous mode is on
//!    and falls back to the configured backup token on any failure. It never
//!    fails.
//!
//! Tokens are not cached; each call re-fetches or re-reads.

mod credentials;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use tracing::debug;

pub use credentials::{CredentialSource, CredentialStore, TOKEN_ENV_VAR};

use crate::client::{AUTH_TIMEOUT, ensure_success};
use crate::fallback::with_fallback;
use crate::headers::build_browser_headers;
use crate::signature::legacy_signature_headers;
use crate::{Error, Result, ZaiClient};

/// HMAC key the legacy scheme uses before a real token exists.
pub const ANONYMOUS_SIGNING_KEY: &str = "anonymous";

/// An opaque bearer token that prevents accidental logging.
#[derive(Clone)]
pub struct AuthToken(SecretString);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the token value.
    ///
    /// Use sparingly - only when actually sending to the API.
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.expose_secret().is_empty()
    }

    /// First and last four characters, for display.
    pub fn masked(&self) -> String {
        let token = self.expose_secret();
        let chars: Vec<char> = token.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl Default for AuthToken {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthToken([REDACTED])")
    }
}

impl From<String> for AuthToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AuthToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for AuthToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Body returned by the anonymous auth endpoint.
#[derive(Debug, Deserialize)]
struct AnonymousAuthResponse {
    #[serde(default)]
    token: Option<String>,
}

impl ZaiClient {
    /// Fetch a guest token from `GET {origin}/api/v1/auths/`.
    ///
    /// # Errors
    ///
    /// - `Error::Timeout` after 10 seconds
    /// - `Error::Request` on transport failure
    /// - `Error::UpstreamStatus` on a non-2xx answer
    /// - `Error::MissingToken` when the body has no non-empty `token`
    pub async fn anonymous_token(&self) -> Result<AuthToken> {
        let mut headers = build_browser_headers(&self.config, None);
        headers.insert("Accept", "*/*");
        headers.insert("Accept-Language", "zh-CN,zh;q=0.9");
        headers.insert("Referer", format!("{}/", self.config.origin()));

        let signature = legacy_signature_headers(ANONYMOUS_SIGNING_KEY, "", "GET");
        for (name, value) in signature.headers() {
            headers.insert(name, value);
        }

        let response = self
            .http
            .get(self.config.auth_url())
            .headers(headers.to_header_map()?)
            .timeout(AUTH_TIMEOUT)
            .send()
            .await
            .map_err(|e| Error::from_reqwest(e, AUTH_TIMEOUT))?;
        let response = ensure_success(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| Error::from_reqwest(e, AUTH_TIMEOUT))?;
        let parsed: AnonymousAuthResponse = serde_json::from_str(&body)?;

        match parsed.token {
            Some(token) if !token.is_empty() => {
                debug!("obtained anonymous token");
                Ok(AuthToken::new(token))
            }
            _ => Err(Error::MissingToken),
        }
    }

    /// Token to use for the next call.
    ///
    /// In anonymous mode this tries [`anonymous_token`](Self::anonymous_token)
    /// first; otherwise, or when that fails, it returns the backup token.
    pub async fn auth_token(&self) -> AuthToken {
        if !self.config.anonymous_mode {
            return self.config.backup_token.clone();
        }
        with_fallback("anonymous token fetch", self.anonymous_token(), || {
            debug!("falling back to backup token");
            self.config.backup_token.clone()
        })
        .await
    }
}
