use anyhow::Result;
use clap::Args;
use zai_client::{ClientConfig, ZaiClient};

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Require a fresh anonymous token (fail instead of falling back)
    #[arg(long)]
    pub anonymous: bool,

    /// Print the full token instead of a masked form
    #[arg(long)]
    pub reveal: bool,
}

pub async fn run(args: TokenArgs, config: ClientConfig) -> Result<()> {
    let client = ZaiClient::new(config);

    let token = if args.anonymous {
        client.anonymous_token().await?
    } else {
        client.auth_token().await
    };

    if token.is_empty() {
        println!("No token available (anonymous auth failed and no backup token is set).");
    } else if args.reveal {
        println!("{}", token.expose_secret());
    } else {
        println!("{}", token.masked());
    }
    Ok(())
}
