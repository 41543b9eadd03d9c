//! CLI application for batch-code capture.

mod api;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, lookup, markup, ocr, url};

/// Batch-code capture - find 10-character batch codes in OCR output and product pages
#[derive(Parser)]
#[command(name = "batchscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a batch code from an OCR transcript
    Ocr(ocr::OcrArgs),

    /// Extract a batch code from a saved HTML page
    Markup(markup::MarkupArgs),

    /// Fetch a product page and extract its batch code
    Url(url::UrlArgs),

    /// Look up the product carrying a batch code
    Lookup(lookup::LookupArgs),

    /// Process multiple transcripts and pages
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Ocr(args) => ocr::run(args, cli.config.as_deref()).await,
        Commands::Markup(args) => markup::run(args, cli.config.as_deref()).await,
        Commands::Url(args) => url::run(args, cli.config.as_deref()).await,
        Commands::Lookup(args) => lookup::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
