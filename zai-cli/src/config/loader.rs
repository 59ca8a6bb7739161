use super::types::{
    RawApiSection, RawAuthSection, RawLoggingSection, RawModelsSection, RawThinkingSection,
    RawZaiConfig,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use zai_client::auth::CredentialStore;
use zai_client::{AuthToken, ClientConfig, DefaultModelIds};

/// Keyring service name for the backup token
pub const CREDENTIAL_SERVICE: &str = "zai";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (defaults <- user <- project <- environment)
    pub fn load() -> Result<ClientConfig> {
        let raw = Self::load_raw(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
            RawZaiConfig::from_env_with(|key| std::env::var(key).ok()),
        )?;

        Ok(Self::finalize(raw, || {
            CredentialStore::new(CREDENTIAL_SERVICE)
                .with_env_fallback()
                .get()
                .ok()
        }))
    }

    /// Merge file layers and an environment overlay into one raw config
    pub fn load_raw(
        user_path: Option<&Path>,
        project_path: &Path,
        env: RawZaiConfig,
    ) -> Result<RawZaiConfig> {
        let mut raw = RawZaiConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user_path
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_file(user_path)?);
        }

        // Layer 2: Project config
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_file(project_path)?);
        }

        // Layer 3: Environment
        Ok(Self::merge_raw(raw, env))
    }

    fn read_file(path: &Path) -> Result<RawZaiConfig> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    /// Get user config path: `$XDG_CONFIG_HOME/zai/config.toml` or `~/.config/zai/config.toml`
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            Some(PathBuf::from(xdg_config).join("zai").join("config.toml"))
        } else {
            dirs::home_dir().map(|home| home.join(".config/zai/config.toml"))
        }
    }

    /// Get project config path
    /// Can be overridden with ZAI_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("ZAI_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".zai/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawZaiConfig, overlay: RawZaiConfig) -> RawZaiConfig {
        RawZaiConfig {
            api: RawApiSection {
                origin: overlay.api.origin.or(base.api.origin),
                endpoint: overlay.api.endpoint.or(base.api.endpoint),
                models_url: overlay.api.models_url.or(base.api.models_url),
            },
            auth: RawAuthSection {
                anonymous: overlay.auth.anonymous.or(base.auth.anonymous),
                backup_token: overlay.auth.backup_token.or(base.auth.backup_token),
            },
            logging: RawLoggingSection {
                debug: overlay.logging.debug.or(base.logging.debug),
            },
            thinking: RawThinkingSection {
                mode: overlay.thinking.mode.or(base.thinking.mode),
            },
            models: RawModelsSection {
                primary: overlay.models.primary.or(base.models.primary),
                thinking: overlay.models.thinking.or(base.models.thinking),
                search: overlay.models.search.or(base.models.search),
                air: overlay.models.air.or(base.models.air),
                vision: overlay.models.vision.or(base.models.vision),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    ///
    /// `stored_token` is consulted only when no backup token is configured.
    pub fn finalize(
        raw: RawZaiConfig,
        stored_token: impl FnOnce() -> Option<AuthToken>,
    ) -> ClientConfig {
        let defaults = ClientConfig::default();
        let default_models = DefaultModelIds::default();

        let backup_token = match raw.auth.backup_token.filter(|t| !t.is_empty()) {
            Some(token) => AuthToken::new(token),
            None => stored_token().unwrap_or_default(),
        };

        ClientConfig {
            origin: raw.api.origin.unwrap_or(defaults.origin),
            api_endpoint: raw.api.endpoint.unwrap_or(defaults.api_endpoint),
            models_url: raw.api.models_url.unwrap_or(defaults.models_url),
            anonymous_mode: raw.auth.anonymous.unwrap_or(defaults.anonymous_mode),
            backup_token,
            debug_logging: raw.logging.debug.unwrap_or(defaults.debug_logging),
            thinking_mode: raw.thinking.mode.unwrap_or(defaults.thinking_mode),
            models: DefaultModelIds {
                primary: raw.models.primary.unwrap_or(default_models.primary),
                thinking: raw.models.thinking.unwrap_or(default_models.thinking),
                search: raw.models.search.unwrap_or(default_models.search),
                air: raw.models.air.unwrap_or(default_models.air),
                vision: raw.models.vision.unwrap_or(default_models.vision),
            },
        }
    }
}
