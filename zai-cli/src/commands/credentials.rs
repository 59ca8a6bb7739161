//! Backup token management.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use dialoguer::{Password, theme::ColorfulTheme};
use zai_client::Error;
use zai_client::auth::{CredentialSource, CredentialStore};

use crate::config::CREDENTIAL_SERVICE;

#[derive(Args, Debug)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommands,
}

#[derive(Subcommand, Debug)]
pub enum CredentialsCommands {
    /// Store the backup token (prompts when omitted)
    Set {
        token: Option<String>,
    },
    /// Delete the stored backup token
    Delete,
    /// Show where the backup token is read from
    Status,
}

pub fn run(args: CredentialsArgs) -> Result<()> {
    let store = CredentialStore::new(CREDENTIAL_SERVICE).with_env_fallback();

    match args.command {
        CredentialsCommands::Set { token } => {
            let token = match token {
                Some(token) => token,
                None => Password::with_theme(&ColorfulTheme::default())
                    .with_prompt("Backup token")
                    .interact()?,
            };
            if token.trim().is_empty() {
                bail!("Token cannot be empty");
            }
            store.set(token.trim())?;
            println!("Backup token stored in keyring.");
        }
        CredentialsCommands::Delete => match store.delete() {
            Ok(()) => println!("Backup token deleted."),
            Err(Error::CredentialsNotFound(_)) => println!("No backup token stored."),
            Err(e) => return Err(e.into()),
        },
        CredentialsCommands::Status => match store.source() {
            Some(CredentialSource::Keyring) => println!("Backup token: keyring"),
            Some(CredentialSource::Environment) => {
                println!("Backup token: environment ({})", zai_client::auth::TOKEN_ENV_VAR)
            }
            None => {
                println!("No backup token configured.");
                println!();
                println!("Store one with: zai credentials set");
            }
        },
    }

    Ok(())
}
