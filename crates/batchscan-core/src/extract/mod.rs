//! Batch-code extraction.

mod pipeline;
pub mod ranker;
pub mod rules;
pub mod scanner;
pub mod structured;

pub use pipeline::{ExtractionInput, ExtractionPipeline, MARKUP_TEXT_HEADER};
pub use ranker::{ConfidenceRanker, RAW_TEXT_HEADER};
pub use scanner::{MarkupHit, MarkupScanner, MarkupStage};

use crate::models::batch::ExtractionResult;
use crate::ocr::OcrTranscript;

/// Trait for batch-code extractors.
///
/// Both operations are total: a missing code is a `found == false` result,
/// never an error.
pub trait BatchExtractor {
    /// Extract from one OCR pass.
    fn extract_ocr(&self, transcript: &OcrTranscript) -> ExtractionResult;

    /// Extract from fetched markup.
    fn extract_markup(&self, content: &str) -> ExtractionResult;
}
