//! Client configuration consumed by every request builder.

use serde::{Deserialize, Serialize};

use crate::auth::AuthToken;

/// Default browser origin of the chat frontend.
pub const DEFAULT_ORIGIN: &str = "https://chat.z.ai";

/// Default chat completion endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://chat.z.ai/api/chat/completions";

/// Default live model list endpoint.
pub const DEFAULT_MODELS_URL: &str = "https://chat.z.ai/api/models";

/// How thinking content in upstream responses should be rendered by callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    /// Drop thinking content entirely.
    Strip,
    /// Wrap thinking content in `<think>` tags.
    #[default]
    Think,
    /// Pass thinking content through untouched.
    Raw,
}

impl std::fmt::Display for ThinkingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strip => write!(f, "strip"),
            Self::Think => write!(f, "think"),
            Self::Raw => write!(f, "raw"),
        }
    }
}

impl std::str::FromStr for ThinkingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strip" => Ok(Self::Strip),
            "think" => Ok(Self::Think),
            "raw" => Ok(Self::Raw),
            other => Err(format!("unknown thinking mode: {other}")),
        }
    }
}

/// Named model identifiers advertised when the live list is unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultModelIds {
    pub primary: String,
    pub thinking: String,
    pub search: String,
    pub air: String,
    pub vision: String,
}

impl Default for DefaultModelIds {
    fn default() -> Self {
        Self {
            primary: "GLM-4.5".to_string(),
            thinking: "GLM-4.5-Thinking".to_string(),
            search: "GLM-4.5-Search".to_string(),
            air: "GLM-4.5-Air".to_string(),
            vision: "GLM-4.5V".to_string(),
        }
    }
}

impl DefaultModelIds {
    /// Model ids in their advertised order.
    pub fn ordered(&self) -> [&str; 5] {
        [
            self.primary.as_str(),
            self.thinking.as_str(),
            self.search.as_str(),
            self.air.as_str(),
            self.vision.as_str(),
        ]
    }
}

/// Settings for the Z.ai client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Browser origin, used for `Origin`/`Referer` and the auth endpoint.
    pub origin: String,
    /// Chat completion endpoint.
    pub api_endpoint: String,
    /// Live model list endpoint.
    pub models_url: String,
    /// Fetch an anonymous token per call instead of using `backup_token`.
    pub anonymous_mode: bool,
    /// Static token used when anonymous mode is off or fails.
    #[serde(skip_serializing)]
    pub backup_token: AuthToken,
    /// Emit debug-level diagnostics.
    pub debug_logging: bool,
    pub thinking_mode: ThinkingMode,
    pub models: DefaultModelIds,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            models_url: DEFAULT_MODELS_URL.to_string(),
            anonymous_mode: true,
            backup_token: AuthToken::default(),
            debug_logging: false,
            thinking_mode: ThinkingMode::default(),
            models: DefaultModelIds::default(),
        }
    }
}

impl ClientConfig {
    /// Origin without a trailing slash.
    pub fn origin(&self) -> &str {
        self.origin.trim_end_matches('/')
    }

    /// URL of the anonymous auth endpoint.
    pub fn auth_url(&self) -> String {
        format!("{}/api/v1/auths/", self.origin())
    }
}
