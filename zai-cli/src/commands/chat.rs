//! One-shot chat against the upstream endpoint.
//!
//! The response body is streamed to stdout unparsed.

use anyhow::{Result, bail};
use clap::Args;
use futures_util::StreamExt;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;
use zai_client::{ClientConfig, ThinkingMode, UpstreamMessage, UpstreamRequest, ZaiClient};

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Prompt text
    pub message: String,

    /// Model id (defaults to the configured primary model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Conversation id used for the referer (random when omitted)
    #[arg(long)]
    pub chat_id: Option<String>,
}

pub async fn run(args: ChatArgs, config: ClientConfig) -> Result<()> {
    let model = args.model.unwrap_or_else(|| config.models.primary.clone());
    let chat_id = args.chat_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let request = build_request(&args.message, &model, &chat_id, config.thinking_mode);

    let client = ZaiClient::new(config);
    let token = client.auth_token().await;
    if token.is_empty() {
        bail!("No token available. Enable anonymous mode or store a backup token.");
    }

    info!(model = %model, chat_id = %chat_id, "sending chat request");
    let response = client.call_upstream(&request, &chat_id, &token).await?;

    let mut stdout = tokio::io::stdout();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        stdout.write_all(&chunk?).await?;
        stdout.flush().await?;
    }
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

fn build_request(message: &str, model: &str, chat_id: &str, mode: ThinkingMode) -> UpstreamRequest {
    UpstreamRequest::new(vec![UpstreamMessage::user(message)])
        .with_field("model", model)
        .with_field("stream", true)
        .with_field("chat_id", chat_id)
        .with_field("id", Uuid::new_v4().to_string())
        .with_field(
            "features",
            json!({ "enable_thinking": mode != ThinkingMode::Strip }),
        )
}
