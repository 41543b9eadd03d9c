//! URL command - fetch a product page and extract its batch code.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use batchscan_core::{BatchExtractor, ExtractionPipeline, UrlExtractionReport};

use super::{load_config, write_output};
use crate::api::{parse_page_url, ApiClient};

/// Arguments for the url command.
#[derive(Args)]
pub struct UrlArgs {
    /// Product page URL (http or https)
    #[arg(required = true)]
    url: String,

    /// Skip the inventory lookup
    #[arg(long)]
    no_lookup: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: UrlArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let url = parse_page_url(&args.url)?;
    let client = ApiClient::new(&config.api)?;

    info!("Fetching {}", url);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")?
            .progress_chars("=>-"),
    );

    let content = client
        .fetch_page(&url, &pb)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to fetch URL: {}", e))?;
    pb.finish_and_clear();

    let pipeline = ExtractionPipeline::from_config(&config.extraction);
    let result = pipeline.extract_markup(&content);

    let mut report = UrlExtractionReport::new(
        url.as_str(),
        &content,
        result.batch,
        config.extraction.preview_chars,
    );

    if !args.no_lookup {
        if let Some(batch) = report.batch_number.clone() {
            let info = client.lookup_or_report(&batch).await;
            report = report.with_product_info(info);
        }
    }

    let output = serde_json::to_string_pretty(&report)?;
    write_output(&output, args.output.as_deref())
}
