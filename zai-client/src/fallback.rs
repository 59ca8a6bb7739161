//! "Try primary, fall back to a default" policy.
//!
//! Token acquisition and model fetching never surface provider failures to
//! callers. Both route through [`with_fallback`].

use std::future::Future;

use tracing::warn;

use crate::Result;

/// Await `primary`; on any error log it and return `default()` instead.
pub async fn with_fallback<T, F, D>(what: &str, primary: F, default: D) -> T
where
    F: Future<Output = Result<T>>,
    D: FnOnce() -> T,
{
    match primary.await {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, "{what} failed, using fallback");
            default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn returns_primary_on_success() {
        let value = with_fallback("test", async { Ok(1) }, || 2).await;
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn returns_default_on_error() {
        let value = with_fallback("test", async { Err(Error::MissingToken) }, || 2).await;
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn default_is_lazy() {
        let mut called = false;
        let value = with_fallback("test", async { Ok("primary") }, || {
            called = true;
            "default"
        })
        .await;
        assert_eq!(value, "primary");
        assert!(!called);
    }
}
