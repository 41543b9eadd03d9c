//! Wire types shared with the inventory API.
//!
//! The core only builds the query key; responses are passed through to the
//! caller for display without interpretation.

use serde::{Deserialize, Serialize};

use super::batch::BatchCode;

/// Path of the batch lookup endpoint, relative to the API base URL.
pub const LOOKUP_ENDPOINT: &str = "/api/search_product";

/// Build the lookup query path for a validated batch code.
pub fn lookup_path(code: &BatchCode) -> String {
    format!("{}/{}", LOOKUP_ENDPOINT, code)
}

/// Response of the batch lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Whether a product carries this batch.
    pub found: bool,

    /// Batch number echoed back by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,

    /// Product name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Units on hand for this batch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,

    /// Product letter code (A, B, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_code: Option<String>,

    /// Per-batch code such as `A1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_code: Option<String>,

    /// Batch row id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<i64>,

    /// Server-side error message, if the lookup itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a URL fetch followed by markup extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlExtractionReport {
    /// The fetched URL.
    pub url: String,
    /// Whether a batch code was found in the page.
    pub batch_found: bool,
    /// The batch code, if any.
    pub batch_number: Option<BatchCode>,
    /// Lookup response for the batch code, when a lookup was performed.
    pub product_info: Option<LookupResponse>,
    /// Leading slice of the page content.
    pub content_preview: String,
    /// Length of the page content in characters.
    pub content_length: usize,
}

impl UrlExtractionReport {
    /// Build a report from fetched content and the extracted code.
    pub fn new(
        url: impl Into<String>,
        content: &str,
        batch: Option<BatchCode>,
        preview_chars: usize,
    ) -> Self {
        Self {
            url: url.into(),
            batch_found: batch.is_some(),
            batch_number: batch,
            product_info: None,
            content_preview: content_preview(content, preview_chars),
            content_length: content.chars().count(),
        }
    }

    /// Attach a lookup response.
    pub fn with_product_info(mut self, info: LookupResponse) -> Self {
        self.product_info = Some(info);
        self
    }
}

/// First `limit` characters of `content`, followed by `...` when truncated.
pub fn content_preview(content: &str, limit: usize) -> String {
    match content.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &content[..idx]),
        None => content.to_string(),
    }
}
