//! Markup command - extract a batch code from a saved page.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use batchscan_core::{BatchExtractor, ExtractionPipeline};

use super::{format_capture, load_config, read_input, write_output, CaptureOutput, OutputFormat};

/// Arguments for the markup command.
#[derive(Args)]
pub struct MarkupArgs {
    /// HTML or other text file; `-` reads stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Report which scan stage matched
    #[arg(long)]
    show_stage: bool,

    /// Look up the extracted batch code in the inventory API
    #[arg(long)]
    lookup: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: MarkupArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    info!("Scanning markup: {}", args.input.display());

    let content = read_input(&args.input)?;
    let pipeline = ExtractionPipeline::from_config(&config.extraction);

    if args.show_stage {
        match pipeline.scan_markup(&content) {
            Some(hit) => eprintln!(
                "{} Matched by {:?} stage",
                style("ℹ").blue(),
                hit.stage
            ),
            None => eprintln!("{} No stage matched", style("ℹ").blue()),
        }
    }

    let mut capture = CaptureOutput::new(pipeline.extract_markup(&content));
    if args.lookup {
        capture = capture.with_lookup(&config).await?;
    }

    let output = format_capture(&capture, args.format)?;
    write_output(&output, args.output.as_deref())
}
