//! Storage for the backup token.
//!
//! The backup token lives in the system keyring, with an environment
//! variable fallback for CI and containers.
//!
//! # Example
//!
//! ```ignore
//! use zai_client::auth::CredentialStore;
//!
//! let store = CredentialStore::new("zai").with_env_fallback();
//! store.set("eyJhbGciOi...")?;
//! let token = store.get()?;
//! ```

use std::env;

use tracing::debug;

use super::AuthToken;
use crate::{Error, Result};

/// Environment variable consulted when the keyring has no entry.
pub const TOKEN_ENV_VAR: &str = "ZAI_TOKEN";

/// Keyring account name for the backup token.
const ACCOUNT: &str = "backup-token";

/// Keyring-backed backup token storage with environment fallback.
///
/// # Storage Priority
///
/// 1. System keyring
/// 2. `ZAI_TOKEN` (if `env_fallback` is enabled)
///
/// Writes always go to the keyring.
pub struct CredentialStore {
    service_name: String,
    env_fallback: bool,
}

impl CredentialStore {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            env_fallback: false,
        }
    }

    /// Also consult `ZAI_TOKEN` when the keyring has nothing.
    pub fn with_env_fallback(mut self) -> Self {
        self.env_fallback = true;
        self
    }

    /// Get the stored backup token.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialsNotFound` if neither source has a token.
    pub fn get(&self) -> Result<AuthToken> {
        if let Some(token) = self.get_from_keyring() {
            debug!(service = %self.service_name, "retrieved backup token from keyring");
            return Ok(token);
        }

        if self.env_fallback
            && let Some(token) = Self::get_from_env()
        {
            debug!("retrieved backup token from environment");
            return Ok(token);
        }

        Err(Error::CredentialsNotFound(self.service_name.clone()))
    }

    /// Store the backup token in the system keyring.
    ///
    /// # Errors
    ///
    /// Returns `Error::Keyring` if the keyring operation fails.
    pub fn set(&self, token: &str) -> Result<()> {
        self.keyring_entry()?
            .set_password(token)
            .map_err(|e| Error::Keyring(e.to_string()))?;
        debug!(service = %self.service_name, "stored backup token in keyring");
        Ok(())
    }

    /// Delete the backup token from the system keyring.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialsNotFound` if nothing was stored and
    /// `Error::Keyring` for other keyring failures.
    pub fn delete(&self) -> Result<()> {
        self.keyring_entry()?
            .delete_credential()
            .map_err(|e| match e {
                keyring::Error::NoEntry => Error::CredentialsNotFound(self.service_name.clone()),
                _ => Error::Keyring(e.to_string()),
            })?;
        debug!(service = %self.service_name, "deleted backup token from keyring");
        Ok(())
    }

    /// Where the token would currently be read from.
    pub fn source(&self) -> Option<CredentialSource> {
        if self.get_from_keyring().is_some() {
            Some(CredentialSource::Keyring)
        } else if self.env_fallback && Self::get_from_env().is_some() {
            Some(CredentialSource::Environment)
        } else {
            None
        }
    }

    fn keyring_entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service_name, ACCOUNT).map_err(|e| Error::Keyring(e.to_string()))
    }

    fn get_from_keyring(&self) -> Option<AuthToken> {
        let entry = self.keyring_entry().ok()?;
        entry.get_password().ok().map(AuthToken::new)
    }

    fn get_from_env() -> Option<AuthToken> {
        env::var(TOKEN_ENV_VAR)
            .ok()
            .filter(|v| !v.is_empty())
            .map(AuthToken::new)
    }
}

/// Source of the stored backup token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Keyring,
    Environment,
}
