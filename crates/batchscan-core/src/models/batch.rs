//! Batch-code data model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BatchCodeError;

/// Number of characters in a canonical batch code.
pub const BATCH_CODE_LEN: usize = 10;

/// Leading character shared by every batch code.
pub const BATCH_CODE_PREFIX: char = '5';

/// A canonical batch code: `5` followed by nine characters from `[A-Z0-9]`.
///
/// The only way to obtain one is through validation, so holding a
/// `BatchCode` is proof of shape. Serialized as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BatchCode(String);

impl BatchCode {
    /// Check a string against the batch-code shape without allocating.
    pub fn check(s: &str) -> Result<(), BatchCodeError> {
        if s.is_empty() {
            return Err(BatchCodeError::Empty);
        }

        let len = s.chars().count();
        if len != BATCH_CODE_LEN {
            return Err(BatchCodeError::Length(len));
        }

        let mut chars = s.chars();
        match chars.next() {
            Some(BATCH_CODE_PREFIX) => {}
            Some(other) => return Err(BatchCodeError::Prefix(other)),
            None => return Err(BatchCodeError::Empty),
        }

        for (i, ch) in chars.enumerate() {
            if !(ch.is_ascii_digit() || ch.is_ascii_uppercase()) {
                return Err(BatchCodeError::Charset { ch, position: i + 1 });
            }
        }

        Ok(())
    }

    /// Whether `s` is exactly a batch code.
    pub fn is_valid(s: &str) -> bool {
        Self::check(s).is_ok()
    }

    /// Trim and upper-case user input, then parse it.
    ///
    /// Used for form input and CLI arguments where `5abc def...` style
    /// casing is common. Inner whitespace is not removed.
    pub fn normalize(raw: &str) -> Result<Self, BatchCodeError> {
        raw.trim().to_uppercase().parse()
    }

    /// Get the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for BatchCode {
    type Err = BatchCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::check(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for BatchCode {
    type Error = BatchCodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::check(&s)?;
        Ok(Self(s))
    }
}

impl From<BatchCode> for String {
    fn from(code: BatchCode) -> Self {
        code.0
    }
}

impl AsRef<str> for BatchCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which pattern or scanner stage produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrigin {
    /// Contiguous `5` + nine characters with word boundaries.
    Primary,
    /// `5 123 456 789` style, digit groups split by whitespace.
    DigitGroups,
    /// `5-ABC-DEF-GHI` style, mixed groups split by whitespace or hyphens.
    MixedGroups,
    /// Label such as `batch:` or `data-batch="..."` in front of the code.
    Keyed,
    /// Found inside an embedded linked-data block.
    StructuredData,
    /// `<meta name="batch" content="...">`.
    MetaTag,
    /// Descriptive label like "batch number" or "生產批次".
    Keyword,
}

/// An extracted substring that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Candidate value with separators already removed.
    pub value: String,
    /// Pattern that produced it.
    pub origin: CandidateOrigin,
    /// Line confidence on the 0-100 scale (OCR path only).
    pub confidence: Option<f64>,
    /// Byte range in the scanned text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched, separators included.
    pub source: String,
}

impl Candidate {
    pub fn new(value: impl Into<String>, origin: CandidateOrigin, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin,
            confidence: None,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    /// Post-match validation. Candidates that fail are silently dropped.
    pub fn validate(&self) -> Option<BatchCode> {
        self.value.parse().ok()
    }
}

/// The single value handed back to the UI for every extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Whether a batch code was recovered.
    pub found: bool,
    /// The recovered code.
    pub batch: Option<BatchCode>,
    /// Winning line confidence (0-100) on the OCR path, `None` for markup.
    pub confidence: Option<f64>,
    /// Human-readable transcript of what was considered.
    pub raw_text: String,
}

impl ExtractionResult {
    /// Build a result from an optional code.
    pub fn new(batch: Option<BatchCode>, confidence: Option<f64>, raw_text: String) -> Self {
        Self {
            found: batch.is_some(),
            batch,
            confidence,
            raw_text,
        }
    }

    /// A result with no match.
    pub fn not_found(confidence: Option<f64>, raw_text: String) -> Self {
        Self::new(None, confidence, raw_text)
    }
}
