//! Browser-mimicking header sets.
//!
//! Every outbound call starts from [`build_browser_headers`], which picks a
//! browser identity from a weighted table and emits a header set consistent
//! with it (User-Agent and `sec-ch-ua` agree on brand and version).
//!
//! # Example
//!
//! ```
//! use zai_client::ClientConfig;
//! use zai_client::headers::build_browser_headers;
//!
//! let config = ClientConfig::default();
//! let headers = build_browser_headers(&config, Some("chat-123"));
//! assert_eq!(headers.get("Referer"), Some("https://chat.z.ai/c/chat-123"));
//! ```

mod user_agent;

use rand::Rng;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

pub use user_agent::{
    BrowserFamily, BrowserIdentity, FALLBACK_MAJOR_VERSION, UserAgentPool, chrome_major_version,
    edge_major_version, user_agents,
};

use crate::{ClientConfig, Error, Result};

/// Frontend build the forged requests claim to come from.
pub const FE_VERSION: &str = "prod-fe-1.0.95";

const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.9,en;q=0.8";

/// Ordered header list with case-insensitive names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.remove(&name);
        self.0.push((name, value.into()));
    }

    /// Remove a header, returning its value if present.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let pos = self
            .0
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Convert to a reqwest header map.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidHeader` if a name or value is not valid HTTP.
    pub fn to_header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| Error::InvalidHeader(format!("{name}: {e}")))?;
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}

/// Build a header set for a randomly chosen browser identity.
pub fn build_browser_headers(config: &ClientConfig, referer_id: Option<&str>) -> HeaderSet {
    build_browser_headers_with(&mut rand::thread_rng(), config, referer_id)
}

/// Build a header set drawing the browser family from `rng`.
pub fn build_browser_headers_with<R: Rng>(
    rng: &mut R,
    config: &ClientConfig,
    referer_id: Option<&str>,
) -> HeaderSet {
    let family = BrowserFamily::pick(rng);
    headers_for_identity(&BrowserIdentity::for_family(family), config, referer_id)
}

/// Build a header set for a fixed browser family.
pub fn headers_for_family(
    family: BrowserFamily,
    config: &ClientConfig,
    referer_id: Option<&str>,
) -> HeaderSet {
    headers_for_identity(&BrowserIdentity::for_family(family), config, referer_id)
}

/// Build a header set for an explicit identity.
pub fn headers_for_identity(
    identity: &BrowserIdentity,
    config: &ClientConfig,
    referer_id: Option<&str>,
) -> HeaderSet {
    debug!(
        browser = identity.family.name(),
        user_agent = %truncate(identity.user_agent, 40),
        "forging browser headers"
    );

    let mut headers = HeaderSet::new();
    headers.insert("Content-Type", "application/json");
    headers.insert("Accept", "application/json, text/event-stream");
    headers.insert("User-Agent", identity.user_agent);
    headers.insert("Accept-Language", ACCEPT_LANGUAGE);
    headers.insert("sec-fetch-dest", "empty");
    headers.insert("sec-fetch-mode", "cors");
    headers.insert("sec-fetch-site", "same-origin");
    headers.insert("X-FE-Version", FE_VERSION);
    headers.insert("Origin", config.origin());
    headers.insert("Cache-Control", "no-cache");
    headers.insert("Pragma", "no-cache");

    if let Some(sec_ch_ua) = identity.sec_ch_ua() {
        headers.insert("sec-ch-ua", sec_ch_ua);
    }

    if let Some(id) = referer_id.filter(|id| !id.is_empty()) {
        headers.insert("Referer", format!("{}/c/{id}", config.origin()));
    }

    headers
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
