use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "zai", about = "Forge browser-like requests against the Z.ai chat API")]
#[command(version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one chat message and stream the raw response
    Chat(commands::chat::ChatArgs),
    /// Manage configuration
    Config(commands::config::ConfigArgs),
    /// Manage the backup token in the system keyring
    Credentials(commands::credentials::CredentialsArgs),
    /// Print a forged browser header set
    Headers(commands::headers::HeadersArgs),
    /// List available models
    Models(commands::models::ModelsArgs),
    /// Compute request signatures
    Sign(commands::sign::SignArgs),
    /// Acquire a bearer token
    Token(commands::token::TokenArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::ConfigLoader::load()?;

    let filter = if cli.verbose || config.debug_logging {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args, config).await,
        Commands::Config(args) => commands::config::run(args, &config),
        Commands::Credentials(args) => commands::credentials::run(args),
        Commands::Headers(args) => commands::headers::run(args, &config),
        Commands::Models(args) => commands::models::run(args, config).await,
        Commands::Sign(args) => commands::sign::run(args),
        Commands::Token(args) => commands::token::run(args, config).await,
    }
}
