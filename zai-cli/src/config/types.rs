use serde::{Deserialize, Serialize};
use zai_client::{ClientConfig, ThinkingMode};

/// Configuration as stored in TOML files (optional fields for merging)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawZaiConfig {
    #[serde(default)]
    pub api: RawApiSection,

    #[serde(default)]
    pub auth: RawAuthSection,

    #[serde(default)]
    pub logging: RawLoggingSection,

    #[serde(default)]
    pub thinking: RawThinkingSection,

    #[serde(default)]
    pub models: RawModelsSection,
}

/// Endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawApiSection {
    /// Browser origin of the chat frontend
    pub origin: Option<String>,

    /// Chat completion endpoint
    pub endpoint: Option<String>,

    /// Live model list endpoint
    pub models_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawAuthSection {
    /// Fetch a guest token per call
    pub anonymous: Option<bool>,

    /// Backup token used when anonymous mode is off or fails
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawLoggingSection {
    pub debug: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawThinkingSection {
    pub mode: Option<ThinkingMode>,
}

/// Default model ids advertised when the live list is unavailable
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawModelsSection {
    pub primary: Option<String>,
    pub thinking: Option<String>,
    pub search: Option<String>,
    pub air: Option<String>,
    pub vision: Option<String>,
}

/// Environment variables that override file configuration
pub const ENV_ORIGIN: &str = "ZAI_ORIGIN";
pub const ENV_API_ENDPOINT: &str = "ZAI_API_ENDPOINT";
pub const ENV_MODELS_URL: &str = "ZAI_MODELS_URL";
pub const ENV_ANONYMOUS: &str = "ZAI_ANONYMOUS";
pub const ENV_DEBUG: &str = "ZAI_DEBUG";
pub const ENV_THINKING_MODE: &str = "ZAI_THINKING_MODE";

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RawZaiConfig {
    /// File-shaped view of an effective config; the backup token is left out
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            api: RawApiSection {
                origin: Some(config.origin.clone()),
                endpoint: Some(config.api_endpoint.clone()),
                models_url: Some(config.models_url.clone()),
            },
            auth: RawAuthSection {
                anonymous: Some(config.anonymous_mode),
                backup_token: None,
            },
            logging: RawLoggingSection {
                debug: Some(config.debug_logging),
            },
            thinking: RawThinkingSection {
                mode: Some(config.thinking_mode),
            },
            models: RawModelsSection {
                primary: Some(config.models.primary.clone()),
                thinking: Some(config.models.thinking.clone()),
                search: Some(config.models.search.clone()),
                air: Some(config.models.air.clone()),
                vision: Some(config.models.vision.clone()),
            },
        }
    }

    /// Build an overlay from environment variables read through `lookup`
    pub fn from_env_with(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api: RawApiSection {
                origin: lookup(ENV_ORIGIN),
                endpoint: lookup(ENV_API_ENDPOINT),
                models_url: lookup(ENV_MODELS_URL),
            },
            auth: RawAuthSection {
                anonymous: lookup(ENV_ANONYMOUS).and_then(|v| parse_flag(&v)),
                backup_token: None,
            },
            logging: RawLoggingSection {
                debug: lookup(ENV_DEBUG).and_then(|v| parse_flag(&v)),
            },
            thinking: RawThinkingSection {
                mode: lookup(ENV_THINKING_MODE).and_then(|v| v.parse().ok()),
            },
            models: RawModelsSection::default(),
        }
    }
}
