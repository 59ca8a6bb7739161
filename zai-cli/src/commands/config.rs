use crate::config::{ConfigLoader, RawZaiConfig};
use anyhow::Result;
use clap::{Args, Subcommand};
use zai_client::ClientConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
}

pub fn run(args: ConfigArgs, config: &ClientConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(config),
        ConfigCommands::Path => show_paths(),
    }
}

/// Effective config in the same layout as `config.toml`
fn render_config(config: &ClientConfig) -> Result<String> {
    Ok(toml::to_string_pretty(&RawZaiConfig::from_config(config))?)
}

fn show_config(config: &ClientConfig) -> Result<()> {
    println!("{}", render_config(config)?);
    let token = if config.backup_token.is_empty() {
        "(not set)".to_string()
    } else {
        config.backup_token.masked()
    };
    println!("# backup token: {}", token);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("User config:    {:?}", ConfigLoader::user_config_path());
    println!("Project config: {:?}", ConfigLoader::project_config_path());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zai_client::{AuthToken, ThinkingMode};

    #[test]
    fn test_rendered_config_uses_file_layout() {
        let config = ClientConfig {
            api_endpoint: "https://example.test/api".to_string(),
            anonymous_mode: false,
            thinking_mode: ThinkingMode::Strip,
            backup_token: AuthToken::new("secret-token"),
            ..Default::default()
        };
        let rendered = render_config(&config).unwrap();

        assert!(rendered.contains("[api]"));
        assert!(rendered.contains("[auth]"));
        assert!(rendered.contains("endpoint = \"https://example.test/api\""));
        assert!(!rendered.contains("api_endpoint"));
        assert!(!rendered.contains("secret-token"));

        let parsed: RawZaiConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, RawZaiConfig::from_config(&config));
        let reloaded = ConfigLoader::finalize(parsed, || None);
        assert_eq!(reloaded.api_endpoint, config.api_endpoint);
        assert!(!reloaded.anonymous_mode);
        assert_eq!(reloaded.thinking_mode, ThinkingMode::Strip);
        assert_eq!(reloaded.models, config.models);
    }
}
