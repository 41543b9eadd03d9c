//! Core library for batch-code capture.
//!
//! This crate provides:
//! - Candidate matching for the canonical `5XXXXXXXXX` batch-code shape
//! - Confidence ranking over OCR transcripts
//! - Markup scanning (keyed patterns, linked-data blocks, meta tags)
//! - A single extraction pipeline returning one `ExtractionResult` per call

pub mod error;
pub mod models;
pub mod ocr;
pub mod extract;

pub use error::{BatchscanError, BatchCodeError, Result};
pub use models::batch::{BatchCode, Candidate, CandidateOrigin, ExtractionResult};
pub use models::config::BatchscanConfig;
pub use models::lookup::{content_preview, lookup_path, LookupResponse, UrlExtractionReport};
pub use ocr::{OcrToken, OcrTranscript};
pub use extract::{BatchExtractor, ConfidenceRanker, ExtractionInput, ExtractionPipeline, MarkupHit, MarkupScanner, MarkupStage};
