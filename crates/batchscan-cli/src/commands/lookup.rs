//! Lookup command - query the inventory API for one batch code.

use clap::Args;
use console::style;

use batchscan_core::BatchCode;

use super::load_config;
use crate::api::ApiClient;

/// Arguments for the lookup command.
#[derive(Args)]
pub struct LookupArgs {
    /// Batch code (case and surrounding whitespace are ignored)
    #[arg(required = true)]
    batch: String,
}

pub async fn run(args: LookupArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let code = BatchCode::normalize(&args.batch)
        .map_err(|e| {
            anyhow::anyhow!("Batch number must be 10 characters starting with 5 ({})", e)
        })?;

    let config = load_config(config_path)?;
    let client = ApiClient::new(&config.api)?;
    let response = client.lookup(&code).await?;

    if !response.found {
        eprintln!(
            "{} No product found for batch {}",
            style("ℹ").blue(),
            code
        );
    }

    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
