//! OCR command - extract a batch code from one OCR transcript.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;
use tracing::info;

use batchscan_core::{BatchExtractor, ExtractionPipeline, OcrToken, OcrTranscript};

use super::{format_capture, load_config, read_input, write_output, CaptureOutput, OutputFormat};

/// Arguments for the ocr command.
#[derive(Args)]
pub struct OcrArgs {
    /// Transcript file (plain text, or JSON `{text, confidence, tokens}`); `-` reads stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Overall engine confidence (0 - 100) for plain-text input
    #[arg(long, default_value = "100")]
    confidence: f64,

    /// Per-line token scores as JSON: `[0.9, 0.4]` or `[{"text": "..", "confidence": 0.9}]`
    #[arg(long)]
    tokens: Option<String>,

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

/// Token scores as accepted on the command line.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenInput {
    Scores(Vec<f64>),
    Tokens(Vec<OcrToken>),
}

impl TokenInput {
    fn into_tokens(self) -> Vec<OcrToken> {
        match self {
            Self::Scores(scores) => scores
                .into_iter()
                .map(|confidence| OcrToken::new("", confidence))
                .collect(),
            Self::Tokens(tokens) => tokens,
        }
    }
}

fn parse_tokens(raw: &str) -> anyhow::Result<Vec<OcrToken>> {
    let input: TokenInput = serde_json::from_str(raw)
        .map_err(|e| anyhow::anyhow!("Invalid token scores: {}", e))?;
    Ok(input.into_tokens())
}

/// Build a transcript from file contents.
///
/// `.json` files hold a serialized transcript; anything else is the bare
/// recognized text scored at `confidence`.
pub fn transcript_from_input(
    path: &Path,
    content: &str,
    confidence: f64,
) -> anyhow::Result<OcrTranscript> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(OcrTranscript::new(content, confidence))
    }
}

pub async fn run(args: OcrArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    info!("Processing transcript: {}", args.input.display());

    let content = read_input(&args.input)?;
    let mut transcript = transcript_from_input(&args.input, &content, args.confidence)?;
    if let Some(raw) = &args.tokens {
        transcript = transcript.with_tokens(parse_tokens(raw)?);
    }

    let pipeline = ExtractionPipeline::from_config(&config.extraction);
    let mut capture = CaptureOutput::new(pipeline.extract_ocr(&transcript));
    if args.lookup {
        capture = capture.with_lookup(&config).await?;
    }

    let output = format_capture(&capture, args.format)?;
    write_output(&output, args.output.as_deref())
}
