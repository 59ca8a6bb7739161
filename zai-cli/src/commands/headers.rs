use anyhow::{Result, anyhow};
use clap::Args;
use zai_client::headers::{build_browser_headers, headers_for_family};
use zai_client::{BrowserFamily, ClientConfig};

#[derive(Args, Debug)]
pub struct HeadersArgs {
    /// Chat id to use as referer
    #[arg(long)]
    pub referer: Option<String>,

    /// Force a browser family (chrome, edge, firefox, safari)
    #[arg(long)]
    pub browser: Option<String>,
}

pub fn run(args: HeadersArgs, config: &ClientConfig) -> Result<()> {
    let referer = args.referer.as_deref();
    let headers = match args.browser {
        Some(name) => {
            let family: BrowserFamily = name.parse().map_err(|e: String| anyhow!(e))?;
            headers_for_family(family, config, referer)
        }
        None => build_browser_headers(config, referer),
    };

    for (name, value) in headers.iter() {
        println!("{name}: {value}");
    }
    Ok(())
}
