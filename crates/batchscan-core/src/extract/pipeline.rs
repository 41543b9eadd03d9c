//! Single entry point for both extraction modes.

use std::fmt::Write;
use std::time::Instant;

use tracing::{debug, info};

use super::{BatchExtractor, ConfidenceRanker, MarkupHit, MarkupScanner};
use crate::models::batch::ExtractionResult;
use crate::models::config::ExtractionConfig;
use crate::models::lookup::content_preview;
use crate::ocr::OcrTranscript;

/// Header line of every markup raw-text transcript.
pub const MARKUP_TEXT_HEADER: &str = "--- Fetched content ---\n\n";

/// What the caller hands to the pipeline.
#[derive(Debug, Clone, Copy)]
pub enum ExtractionInput<'a> {
    /// Output of one OCR pass.
    Ocr(&'a OcrTranscript),
    /// Raw fetched text content (HTML or similar).
    Markup(&'a str),
}

/// Extraction pipeline over OCR transcripts and fetched markup.
#[derive(Debug, Clone)]
pub struct ExtractionPipeline {
    ranker: ConfidenceRanker,
    scanner: MarkupScanner,
    /// Characters of markup copied into the raw text.
    preview_chars: usize,
}

impl ExtractionPipeline {
    /// Create a pipeline with default settings.
    pub fn new() -> Self {
        Self {
            ranker: ConfidenceRanker::new(),
            scanner: MarkupScanner::new(),
            preview_chars: 500,
        }
    }

    /// Create a pipeline from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_ranker(ConfidenceRanker::from_config(config))
            .with_scanner(MarkupScanner::new().with_structured_data(config.structured_data))
            .with_preview_chars(config.preview_chars)
    }

    /// Set the OCR ranker.
    pub fn with_ranker(mut self, ranker: ConfidenceRanker) -> Self {
        self.ranker = ranker;
        self
    }

    /// Set the markup scanner.
    pub fn with_scanner(mut self, scanner: MarkupScanner) -> Self {
        self.scanner = scanner;
        self
    }

    /// Set how much markup is copied into the raw text.
    pub fn with_preview_chars(mut self, chars: usize) -> Self {
        self.preview_chars = chars;
        self
    }

    /// Run the pipeline on either kind of input.
    pub fn extract(&self, input: ExtractionInput<'_>) -> ExtractionResult {
        match input {
            ExtractionInput::Ocr(transcript) => self.extract_ocr(transcript),
            ExtractionInput::Markup(content) => self.extract_markup(content),
        }
    }

    /// Scan markup and report which stage matched.
    pub fn scan_markup(&self, content: &str) -> Option<MarkupHit> {
        self.scanner.scan(content)
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchExtractor for ExtractionPipeline {
    fn extract_ocr(&self, transcript: &OcrTranscript) -> ExtractionResult {
        let start = Instant::now();
        let result = self.ranker.rank(transcript);

        info!(
            "OCR extraction: found={} batch={:?} in {}us",
            result.found,
            result.batch.as_ref().map(|b| b.as_str()),
            start.elapsed().as_micros()
        );

        result
    }

    fn extract_markup(&self, content: &str) -> ExtractionResult {
        let start = Instant::now();
        let hit = self.scan_markup(content);

        let mut raw_text = String::from(MARKUP_TEXT_HEADER);
        raw_text.push_str(&content_preview(content, self.preview_chars));
        raw_text.push_str("\n\n");
        match &hit {
            Some(hit) => {
                let _ = writeln!(
                    raw_text,
                    "Extracted: {} ({:?}, {:?})",
                    hit.code,
                    hit.stage,
                    hit.stage.origin()
                );
            }
            None => raw_text.push_str("Extracted: (none)\n"),
        }

        debug!("Scanned {} bytes of markup", content.len());
        info!(
            "Markup extraction: found={} batch={:?} in {}us",
            hit.is_some(),
            hit.as_ref().map(|h| h.code.as_str()),
            start.elapsed().as_micros()
        );

        match hit {
            Some(hit) => ExtractionResult::new(Some(hit.code), None, raw_text),
            None => ExtractionResult::not_found(None, raw_text),
        }
    }
}
