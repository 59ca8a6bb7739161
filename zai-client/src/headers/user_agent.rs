//! Canned browser identities and User-Agent parsing.

use std::collections::HashMap;
use std::sync::OnceLock;

use rand::Rng;
use rand::seq::SliceRandom;

/// Major version assumed when a User-Agent does not carry one.
pub const FALLBACK_MAJOR_VERSION: &str = "139";

/// Browser families the header builder can impersonate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserFamily {
    Chrome,
    Edge,
    Firefox,
    Safari,
}

/// Weighted draw table: Chrome 3/7, Edge 2/7, Firefox 1/7, Safari 1/7.
const WEIGHTED_FAMILIES: [BrowserFamily; 7] = [
    BrowserFamily::Chrome,
    BrowserFamily::Chrome,
    BrowserFamily::Chrome,
    BrowserFamily::Edge,
    BrowserFamily::Edge,
    BrowserFamily::Firefox,
    BrowserFamily::Safari,
];

impl BrowserFamily {
    pub const ALL: [BrowserFamily; 4] = [Self::Chrome, Self::Edge, Self::Firefox, Self::Safari];

    /// Draw a family from the weighted table.
    pub fn pick<R: Rng>(rng: &mut R) -> Self {
        Self::from_slot(rng.gen_range(0..WEIGHTED_FAMILIES.len()))
    }

    /// Family occupying `slot` of the weighted table (wraps around).
    pub fn from_slot(slot: usize) -> Self {
        WEIGHTED_FAMILIES[slot % WEIGHTED_FAMILIES.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
        }
    }
}

impl std::str::FromStr for BrowserFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown browser family: {s}"))
    }
}

/// Process-lifetime set of canned User-Agent strings.
#[derive(Debug)]
pub struct UserAgentPool {
    by_family: HashMap<BrowserFamily, &'static str>,
    default: &'static str,
}

impl UserAgentPool {
    fn build<R: Rng>(rng: &mut R) -> Self {
        let by_family = HashMap::from([
            (
                BrowserFamily::Chrome,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36",
            ),
            (
                BrowserFamily::Edge,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36 Edg/139.0.0.0",
            ),
            (
                BrowserFamily::Firefox,
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:141.0) Gecko/20100101 Firefox/141.0",
            ),
            (
                BrowserFamily::Safari,
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.5 Safari/605.1.15",
            ),
        ]);
        let default = BrowserFamily::ALL
            .choose(rng)
            .and_then(|family| by_family.get(family))
            .copied()
            .unwrap_or(by_family[&BrowserFamily::Chrome]);

        Self { by_family, default }
    }

    /// User-Agent for `family`, or the pool default when it has none.
    pub fn get(&self, family: BrowserFamily) -> &'static str {
        self.by_family.get(&family).copied().unwrap_or(self.default)
    }

    /// The UA picked once when the pool was built.
    pub fn default_user_agent(&self) -> &'static str {
        self.default
    }
}

static USER_AGENTS: OnceLock<UserAgentPool> = OnceLock::new();

/// Shared User-Agent pool, built on first use.
pub fn user_agents() -> &'static UserAgentPool {
    USER_AGENTS.get_or_init(|| UserAgentPool::build(&mut rand::thread_rng()))
}

/// Text between `marker` and the next `.`, if both exist.
fn version_after<'a>(user_agent: &'a str, marker: &str) -> Option<&'a str> {
    let start = user_agent.find(marker)? + marker.len();
    let rest = &user_agent[start..];
    let end = rest.find('.')?;
    let version = &rest[..end];
    (!version.is_empty()).then_some(version)
}

/// Chrome-equivalent major version, defaulting to [`FALLBACK_MAJOR_VERSION`].
pub fn chrome_major_version(user_agent: &str) -> &str {
    version_after(user_agent, "Chrome/").unwrap_or(FALLBACK_MAJOR_VERSION)
}

/// Edge major version, defaulting to [`FALLBACK_MAJOR_VERSION`].
pub fn edge_major_version(user_agent: &str) -> &str {
    version_after(user_agent, "Edg/").unwrap_or(FALLBACK_MAJOR_VERSION)
}

/// A chosen browser family with its UA and parsed versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub family: BrowserFamily,
    pub user_agent: &'static str,
    pub chrome_version: String,
    pub edge_version: Option<String>,
}

impl BrowserIdentity {
    pub fn new(family: BrowserFamily, user_agent: &'static str) -> Self {
        let edge_version = user_agent
            .contains("Edg/")
            .then(|| edge_major_version(user_agent).to_string());
        Self {
            family,
            user_agent,
            chrome_version: chrome_major_version(user_agent).to_string(),
            edge_version,
        }
    }

    /// Identity for `family` from the shared pool.
    pub fn for_family(family: BrowserFamily) -> Self {
        Self::new(family, user_agents().get(family))
    }

    fn is_firefox(&self) -> bool {
        self.family == BrowserFamily::Firefox || self.user_agent.contains("Firefox/")
    }

    /// `sec-ch-ua` value matching this identity; `None` for Firefox.
    pub fn sec_ch_ua(&self) -> Option<String> {
        if self.is_firefox() {
            return None;
        }
        let chrome = &self.chrome_version;
        Some(match &self.edge_version {
            Some(edge) => format!(
                r#""Microsoft Edge";v="{edge}", "Chromium";v="{chrome}", "Not_A Brand";v="24""#
            ),
            None => format!(
                r#""Not;A=Brand";v="99", "Google Chrome";v="{chrome}", "Chromium";v="{chrome}""#
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weighted_table_matches_distribution() {
        let count = |family| WEIGHTED_FAMILIES.iter().filter(|f| **f == family).count();
        assert_eq!(count(BrowserFamily::Chrome), 3);
        assert_eq!(count(BrowserFamily::Edge), 2);
        assert_eq!(count(BrowserFamily::Firefox), 1);
        assert_eq!(count(BrowserFamily::Safari), 1);
    }

    #[test]
    fn from_slot_wraps() {
        assert_eq!(BrowserFamily::from_slot(5), BrowserFamily::Firefox);
        assert_eq!(BrowserFamily::from_slot(7), BrowserFamily::Chrome);
    }

    #[test]
    fn parses_family_names() {
        assert_eq!("Edge".parse::<BrowserFamily>().unwrap(), BrowserFamily::Edge);
        assert!("opera".parse::<BrowserFamily>().is_err());
    }

    #[test]
    fn pool_is_built_once() {
        let a = user_agents() as *const UserAgentPool;
        let b = user_agents() as *const UserAgentPool;
        assert_eq!(a, b);
        let default = user_agents().default_user_agent();
        assert!(
            BrowserFamily::ALL
                .iter()
                .any(|f| user_agents().get(*f) == default)
        );
    }

    #[test]
    fn extracts_chrome_and_edge_versions() {
        let ua = user_agents().get(BrowserFamily::Edge);
        assert_eq!(chrome_major_version(ua), "139");
        assert_eq!(edge_major_version(ua), "139");

        let ua = "Mozilla/5.0 AppleWebKit/537.36 Chrome/126.0.6478.127 Safari/537.36 Edg/125.0.2535.92";
        assert_eq!(chrome_major_version(ua), "126");
        assert_eq!(edge_major_version(ua), "125");
    }

    #[test]
    fn version_parsing_falls_back() {
        assert_eq!(chrome_major_version("curl/8.0"), FALLBACK_MAJOR_VERSION);
        assert_eq!(chrome_major_version("Chrome/"), FALLBACK_MAJOR_VERSION);
        assert_eq!(chrome_major_version("Chrome/140"), FALLBACK_MAJOR_VERSION);
        assert_eq!(edge_major_version("Edg/.1"), FALLBACK_MAJOR_VERSION);
    }

    #[test]
    fn sec_ch_ua_brands_by_family() {
        let edge = BrowserIdentity::for_family(BrowserFamily::Edge);
        assert!(edge.sec_ch_ua().unwrap().contains(r#""Microsoft Edge";v="139""#));

        let chrome = BrowserIdentity::for_family(BrowserFamily::Chrome);
        let value = chrome.sec_ch_ua().unwrap();
        assert!(value.contains(r#""Google Chrome";v="139""#));
        assert!(!value.contains("Edge"));

        let safari = BrowserIdentity::for_family(BrowserFamily::Safari);
        assert!(safari.sec_ch_ua().unwrap().contains(r#""Chromium";v="139""#));

        assert!(BrowserIdentity::for_family(BrowserFamily::Firefox).sec_ch_ua().is_none());
    }

    #[test]
    fn malformed_edge_ua_still_gets_edge_brand() {
        let identity = BrowserIdentity::new(BrowserFamily::Edge, "Mozilla/5.0 Edg/");
        let value = identity.sec_ch_ua().unwrap();
        assert!(value.contains(r#""Microsoft Edge";v="139""#));
        assert!(value.contains(r#""Chromium";v="139""#));
    }
}
