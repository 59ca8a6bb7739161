use anyhow::Result;
use clap::{Args, Subcommand};
use zai_client::signature::{generate_chat_signature, legacy_signature_headers};

#[derive(Args, Debug)]
pub struct SignArgs {
    #[command(subcommand)]
    pub command: SignCommands,
}

#[derive(Subcommand, Debug)]
pub enum SignCommands {
    /// Current double-HMAC chat signature
    Chat {
        /// Request descriptor, e.g. "requestId,...,timestamp,...,user_id,..."
        descriptor: String,
        /// Prompt text
        text: String,
    },
    /// Legacy X-Timestamp/X-Nonce/X-Signature headers
    Legacy {
        /// HMAC key
        #[arg(default_value = "anonymous")]
        token: String,
        #[arg(long, default_value = "")]
        body: String,
        #[arg(long, default_value = "POST")]
        method: String,
    },
}

pub fn run(args: SignArgs) -> Result<()> {
    match args.command {
        SignCommands::Chat { descriptor, text } => {
            let payload = generate_chat_signature(&descriptor, &text);
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        SignCommands::Legacy {
            token,
            body,
            method,
        } => {
            let signature = legacy_signature_headers(&token, &body, &method);
            for (name, value) in signature.headers() {
                println!("{name}: {value}");
            }
        }
    }
    Ok(())
}
