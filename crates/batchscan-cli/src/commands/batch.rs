//! Batch command - extract batch codes from many files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use batchscan_core::{BatchExtractor, ExtractionPipeline, ExtractionResult};

use super::ocr::transcript_from_input;
use super::{format_capture, load_config, CaptureOutput, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Engine confidence (0 - 100) for plain-text transcripts
    #[arg(long, default_value = "100")]
    confidence: f64,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// How a file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Markup,
    Transcript,
}

impl InputKind {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        match ext.as_str() {
            "html" | "htm" | "xhtml" | "xml" => Some(Self::Markup),
            "txt" | "json" => Some(Self::Transcript),
            _ => None,
        }
    }
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    kind: InputKind,
    result: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    // Expand glob pattern
    let files: Vec<(PathBuf, InputKind)> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter_map(|p| InputKind::from_path(&p).map(|kind| (p, kind)))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let pipeline = ExtractionPipeline::from_config(&config.extraction);
    let mut results = Vec::with_capacity(files.len());

    for (path, kind) in files {
        let file_start = Instant::now();
        let outcome = process_single_file(&path, kind, &pipeline, args.confidence);
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(result) => results.push(ProcessResult {
                path,
                kind,
                result: Some(result),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        kind,
                        result: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    if let Some(output_dir) = &args.output_dir {
        for processed in &results {
            if let Some(result) = &processed.result {
                let output_path = output_dir.join(output_file_name(&processed.path, args.format));
                let capture = CaptureOutput::new(result.clone());
                fs::write(&output_path, format_capture(&capture, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let found = results
        .iter()
        .filter(|r| r.result.as_ref().is_some_and(|res| res.found))
        .count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} with batch code, {} without, {} failed",
        style(found).green(),
        style(results.len() - found - failed.len()).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    kind: InputKind,
    pipeline: &ExtractionPipeline,
    confidence: f64,
) -> anyhow::Result<ExtractionResult> {
    let content = fs::read_to_string(path)?;

    match kind {
        InputKind::Markup => Ok(pipeline.extract_markup(&content)),
        InputKind::Transcript => {
            let transcript = transcript_from_input(path, &content, confidence)?;
            Ok(pipeline.extract_ocr(&transcript))
        }
    }
}

fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("capture");

    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Csv => "csv",
        OutputFormat::Text => "txt",
    };

    format!("{}.{}", stem, extension)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "mode",
        "status",
        "batch",
        "confidence",
        "processing_time_ms",
        "error",
    ])?;

    for processed in results {
        let filename = processed
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let mode = match processed.kind {
            InputKind::Markup => "markup",
            InputKind::Transcript => "ocr",
        };

        match &processed.result {
            Some(result) => wtr.write_record([
                filename,
                mode,
                if result.found { "found" } else { "not_found" },
                result.batch.as_ref().map(|b| b.as_str()).unwrap_or(""),
                &result.confidence.map(|c| format!("{:.1}", c)).unwrap_or_default(),
                &processed.processing_time_ms.to_string(),
                "",
            ])?,
            None => wtr.write_record([
                filename,
                mode,
                "error",
                "",
                "",
                &processed.processing_time_ms.to_string(),
                processed.error.as_deref().unwrap_or(""),
            ])?,
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::from_path(Path::new("page.HTML")), Some(InputKind::Markup));
        assert_eq!(InputKind::from_path(Path::new("scan.json")), Some(InputKind::Transcript));
        assert_eq!(InputKind::from_path(Path::new("scan.txt")), Some(InputKind::Transcript));
        assert_eq!(InputKind::from_path(Path::new("photo.png")), None);
        assert_eq!(InputKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Path::new("in/scan.txt"), OutputFormat::Json), "scan.json");
        assert_eq!(output_file_name(Path::new("page.html"), OutputFormat::Text), "page.txt");
    }

    #[test]
    fn test_summary_rows() {
        let dir = tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let pipeline = ExtractionPipeline::new();

        let results = vec![
            ProcessResult {
                path: PathBuf::from("a.txt"),
                kind: InputKind::Transcript,
                result: Some(pipeline.extract_ocr(&batchscan_core::OcrTranscript::new("5ABCDEFGHJ", 90.0))),
                error: None,
                processing_time_ms: 1,
            },
            ProcessResult {
                path: PathBuf::from("b.html"),
                kind: InputKind::Markup,
                result: None,
                error: Some("stream did not contain valid UTF-8".to_string()),
                processing_time_ms: 2,
            },
        ];

        write_summary(&summary, &results).unwrap();
        let content = fs::read_to_string(&summary).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a.txt,ocr,found,5ABCDEFGHJ,50.0,1,");
        assert_eq!(lines[2], "b.html,markup,error,,,2,stream did not contain valid UTF-8");
    }
}
