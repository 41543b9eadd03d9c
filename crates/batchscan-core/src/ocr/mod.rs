//! OCR engine output consumed by the extraction pipeline.
//!
//! The engine itself runs outside this crate (in the browser or another
//! process); these types describe what it must hand over.

use serde::{Deserialize, Serialize};

/// A recognized unit of OCR output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrToken {
    /// Recognized text content.
    #[serde(default)]
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f64,
}

impl OcrToken {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Result of one OCR pass over a captured image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrTranscript {
    /// Full transcript, lines separated by `\n`.
    pub text: String,

    /// Overall engine confidence (0 - 100).
    #[serde(default)]
    pub confidence: f64,

    /// Tokens aligned by index to the non-empty transcript lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<Vec<OcrToken>>,
}

impl OcrTranscript {
    /// Create a transcript without token scores.
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
            tokens: None,
        }
    }

    /// Attach tokens.
    pub fn with_tokens(mut self, tokens: Vec<OcrToken>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Attach bare token confidences (0.0 - 1.0), one per line.
    pub fn with_token_confidences(self, confidences: &[f64]) -> Self {
        let tokens = confidences
            .iter()
            .map(|&c| OcrToken::new(String::new(), c))
            .collect();
        self.with_tokens(tokens)
    }

    /// Trimmed, upper-cased, non-empty lines of the transcript.
    pub fn lines(&self) -> Vec<String> {
        self.text
            .split('\n')
            .map(|line| line.trim().to_uppercase())
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Confidence (0 - 100) for the line at `index`, or `default` when the
    /// engine produced no token there.
    pub fn line_confidence(&self, index: usize, default: f64) -> f64 {
        self.tokens
            .as_ref()
            .and_then(|tokens| tokens.get(index))
            .map(|token| token.confidence * 100.0)
            .unwrap_or(default)
    }

    /// Whole transcript upper-cased with every whitespace run collapsed to
    /// a single space.
    pub fn normalized_document(&self) -> String {
        self.text
            .to_uppercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
