//! Model listing.
//!
//! Shows the static defaults merged with the provider's live list, the same
//! view API consumers get.

use anyhow::Result;
use chrono::{TimeZone, Utc};
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tracing::debug;
use zai_client::{ClientConfig, ZaiClient, ZaiModel};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Skip the live fetch and show configured defaults only
    #[arg(long)]
    pub defaults_only: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ModelsArgs, config: ClientConfig) -> Result<()> {
    let client = ZaiClient::new(config);

    let models = if args.defaults_only {
        client.default_models()
    } else {
        client.available_models().await
    };
    debug!("{} models available", models.len());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::Cyan),
        Cell::new("Name").fg(Color::Cyan),
        Cell::new("Owner").fg(Color::Cyan),
        Cell::new("Created").fg(Color::Cyan),
    ]);

    for model in &models {
        table.add_row(vec![
            Cell::new(&model.id),
            Cell::new(model.name.as_deref().unwrap_or(&model.id)),
            Cell::new(model.owned_by.as_deref().unwrap_or("-")),
            Cell::new(format_created(model)),
        ]);
    }

    println!("{table}");
    Ok(())
}

fn format_created(model: &ZaiModel) -> String {
    model
        .created
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
