//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod lookup;
pub mod markup;
pub mod ocr;
pub mod url;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use console::style;
use serde::Serialize;
use tracing::debug;

use batchscan_core::{BatchscanConfig, ExtractionResult, LookupResponse};

use crate::api::ApiClient;

/// Output format for single-result commands.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("batchscan")
        .join("config.json")
}

/// Load configuration from an explicit path, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BatchscanConfig> {
    if let Some(path) = config_path {
        return Ok(BatchscanConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using configuration from {}", path.display());
        Ok(BatchscanConfig::from_file(&path)?)
    } else {
        Ok(BatchscanConfig::default())
    }
}

/// Read an input file, or stdin when the path is `-`.
pub fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    Ok(fs::read_to_string(path)?)
}

/// One extraction result plus the optional lookup that followed it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOutput {
    #[serde(flatten)]
    pub result: ExtractionResult,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_info: Option<LookupResponse>,
}

impl CaptureOutput {
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            result,
            product_info: None,
        }
    }

    /// Look up the extracted batch code, if there is one.
    pub async fn with_lookup(mut self, config: &BatchscanConfig) -> anyhow::Result<Self> {
        if let Some(batch) = &self.result.batch {
            let client = ApiClient::new(&config.api)?;
            self.product_info = Some(client.lookup_or_report(batch).await);
        }
        Ok(self)
    }
}

/// Render a capture in the requested format.
pub fn format_capture(capture: &CaptureOutput, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(capture)?),
        OutputFormat::Csv => format_csv(capture),
        OutputFormat::Text => Ok(format_text(capture)),
    }
}

fn format_csv(capture: &CaptureOutput) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "found",
        "batch",
        "confidence",
        "product_found",
        "product_name",
        "product_code",
        "unique_code",
    ])?;

    let result = &capture.result;
    let info = capture.product_info.as_ref();

    wtr.write_record([
        result.found.to_string(),
        result.batch.as_ref().map(|b| b.to_string()).unwrap_or_default(),
        result.confidence.map(|c| format!("{:.1}", c)).unwrap_or_default(),
        info.map(|i| i.found.to_string()).unwrap_or_default(),
        info.and_then(|i| i.name.clone()).unwrap_or_default(),
        info.and_then(|i| i.product_code.clone()).unwrap_or_default(),
        info.and_then(|i| i.unique_code.clone()).unwrap_or_default(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(capture: &CaptureOutput) -> String {
    let result = &capture.result;
    let mut output = String::new();

    match &result.batch {
        Some(batch) => output.push_str(&format!("Batch: {}\n", batch)),
        None => output.push_str("Batch: not found\n"),
    }
    if let Some(confidence) = result.confidence {
        output.push_str(&format!("Confidence: {:.1}\n", confidence));
    }

    if let Some(info) = &capture.product_info {
        output.push('\n');
        if info.found {
            output.push_str("Product:\n");
            if let Some(name) = &info.name {
                output.push_str(&format!("  Name: {}\n", name));
            }
            if let Some(code) = &info.product_code {
                output.push_str(&format!("  Product code: {}\n", code));
            }
            if let Some(code) = &info.unique_code {
                output.push_str(&format!("  Unique code: {}\n", code));
            }
            if let Some(quantity) = info.quantity {
                output.push_str(&format!("  Quantity: {}\n", quantity));
            }
        } else {
            output.push_str("Product: not in inventory\n");
            if let Some(error) = &info.error {
                output.push_str(&format!("  Error: {}\n", error));
            }
        }
    }

    output.push('\n');
    output.push_str(&result.raw_text);
    output
}

/// Write rendered output to a file, or stdout.
pub fn write_output(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(output_path) = path {
        fs::write(output_path, output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    Ok(())
}
