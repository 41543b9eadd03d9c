//! WASM bindings for batch-code capture.
//!
//! The browser runs OCR itself and hands the transcript over; these bindings
//! run the extraction pipeline and return plain JS objects.

use wasm_bindgen::prelude::*;

use batchscan_core::extract::BatchExtractor as _;
use batchscan_core::models::config::ExtractionConfig;
use batchscan_core::{BatchCode, BatchscanConfig, ExtractionPipeline, ExtractionResult, OcrTranscript};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(result: &ExtractionResult) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(result).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn transcript(text: &str, confidence: f64, token_confidences: Option<Vec<f64>>) -> OcrTranscript {
    let transcript = OcrTranscript::new(text, confidence);
    match token_confidences {
        Some(scores) => transcript.with_token_confidences(&scores),
        None => transcript,
    }
}

/// Extract a batch code from an OCR transcript.
///
/// `confidence` is the engine's overall score (0 - 100); `token_confidences`
/// holds one 0 - 1 score per non-empty line.
#[wasm_bindgen]
pub fn extract_from_ocr(
    text: &str,
    confidence: f64,
    token_confidences: Option<Vec<f64>>,
) -> Result<JsValue, JsValue> {
    let pipeline = ExtractionPipeline::new();
    to_js(&pipeline.extract_ocr(&transcript(text, confidence, token_confidences)))
}

/// Extract a batch code from fetched HTML or similar text.
#[wasm_bindgen]
pub fn extract_from_markup(content: &str) -> Result<JsValue, JsValue> {
    to_js(&ExtractionPipeline::new().extract_markup(content))
}

/// Whether `s` is exactly a batch code (`5` followed by nine `A-Z`/`0-9`).
#[wasm_bindgen]
pub fn validate_batch_code(s: &str) -> bool {
    BatchCode::is_valid(s)
}

/// Trim and upper-case form input, returning `None` when it is not a batch code.
#[wasm_bindgen]
pub fn normalize_batch_code(s: &str) -> Option<String> {
    BatchCode::normalize(s).ok().map(BatchCode::into_inner)
}

/// Inventory API path for a batch code.
#[wasm_bindgen]
pub fn lookup_path(code: &str) -> Result<String, JsValue> {
    let code: BatchCode = code
        .parse()
        .map_err(|e: batchscan_core::BatchCodeError| JsValue::from_str(&e.to_string()))?;
    Ok(batchscan_core::lookup_path(&code))
}

/// Batch extractor class for browser use.
#[wasm_bindgen]
pub struct BatchExtractor {
    pipeline: ExtractionPipeline,
}

#[wasm_bindgen]
impl BatchExtractor {
    /// Create an extractor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            pipeline: ExtractionPipeline::new(),
        }
    }

    /// Create an extractor from a JSON configuration document.
    ///
    /// Accepts either a full config (`{"extraction": {...}}`) or the
    /// extraction section alone.
    #[wasm_bindgen]
    pub fn from_config(json: &str) -> Result<BatchExtractor, JsValue> {
        let config = parse_extraction_config(json).map_err(|e| JsValue::from_str(&e))?;
        Ok(Self {
            pipeline: ExtractionPipeline::from_config(&config),
        })
    }

    /// Extract from an OCR transcript.
    #[wasm_bindgen]
    pub fn extract_ocr(
        &self,
        text: &str,
        confidence: f64,
        token_confidences: Option<Vec<f64>>,
    ) -> Result<JsValue, JsValue> {
        to_js(&self.pipeline.extract_ocr(&transcript(text, confidence, token_confidences)))
    }

    /// Extract from fetched markup.
    #[wasm_bindgen]
    pub fn extract_markup(&self, content: &str) -> Result<JsValue, JsValue> {
        to_js(&self.pipeline.extract_markup(content))
    }

    /// Name of the markup stage that matches `content`, if any.
    #[wasm_bindgen]
    pub fn markup_stage(&self, content: &str) -> Option<String> {
        self.pipeline
            .scan_markup(content)
            .map(|hit| format!("{:?}", hit.stage))
    }
}

impl Default for BatchExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_extraction_config(json: &str) -> Result<ExtractionConfig, String> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;

    let config = if value.get("extraction").is_some() || value.get("api").is_some() {
        serde_json::from_value::<BatchscanConfig>(value).map_err(|e| e.to_string())?
    } else {
        BatchscanConfig {
            extraction: serde_json::from_value(value).map_err(|e| e.to_string())?,
            ..Default::default()
        }
    };

    config.validate().map_err(|e| e.to_string())?;
    Ok(config.extraction)
}
