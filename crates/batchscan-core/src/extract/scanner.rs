//! Structured-content scanning of fetched markup.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::rules::{
    FieldExtractor, MatchRule, BATCH_INPUT_VALUE, BATCH_KEYWORD, DATA_BATCH_ATTR, KEYED_BATCH,
    KEYED_BATCH_CJK, KEYED_BATCH_NUMBER, META_BATCH, META_BATCH_REVERSED,
};
use super::structured::scan_linked_data;
use crate::models::batch::{BatchCode, CandidateOrigin};

/// One stage of the markup scan. Stages run in [`MarkupStage::ORDER`] and the
/// first hit ends the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupStage {
    /// Bare code anywhere in the document.
    DirectPattern,
    /// `batch: ...`, `批次...`, `batch_number=...`, `data-batch="..."`, `id="batch" value="..."`.
    KeyedPattern,
    /// `application/ld+json` script blocks.
    StructuredData,
    /// `<meta name="batch" content="...">`.
    MetaTag,
    /// Descriptive labels such as "batch number" or "生產批次".
    Keyword,
}

impl MarkupStage {
    pub const ORDER: [MarkupStage; 5] = [
        Self::DirectPattern,
        Self::KeyedPattern,
        Self::StructuredData,
        Self::MetaTag,
        Self::Keyword,
    ];

    /// Candidate origin reported for hits of this stage.
    pub fn origin(self) -> CandidateOrigin {
        match self {
            Self::DirectPattern => CandidateOrigin::Primary,
            Self::KeyedPattern => CandidateOrigin::Keyed,
            Self::StructuredData => CandidateOrigin::StructuredData,
            Self::MetaTag => CandidateOrigin::MetaTag,
            Self::Keyword => CandidateOrigin::Keyword,
        }
    }

    /// Run this stage. `content` is the original text, `upper` its
    /// upper-cased form.
    fn run(self, content: &str, upper: &str) -> Option<BatchCode> {
        match self {
            Self::DirectPattern => MatchRule::Primary
                .extract_all(upper)
                .iter()
                .find_map(|candidate| candidate.validate()),
            Self::KeyedPattern => {
                let patterns: [&Regex; 5] = [
                    &KEYED_BATCH,
                    &KEYED_BATCH_CJK,
                    &KEYED_BATCH_NUMBER,
                    &DATA_BATCH_ATTR,
                    &BATCH_INPUT_VALUE,
                ];
                patterns.iter().find_map(|re| first_capture(re, upper))
            }
            // Parsed from the original text: upper-casing would break
            // JSON literals such as `true` and `null`.
            Self::StructuredData => scan_linked_data(content),
            Self::MetaTag => first_capture(&META_BATCH, upper)
                .or_else(|| first_capture(&META_BATCH_REVERSED, upper)),
            Self::Keyword => first_capture(&BATCH_KEYWORD, upper),
        }
    }
}

/// First capture group of `re` in `text` that validates as a batch code.
fn first_capture(re: &Regex, text: &str) -> Option<BatchCode> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|m| m.as_str().parse().ok())
}

/// A batch code found in markup, with the stage that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupHit {
    pub code: BatchCode,
    pub stage: MarkupStage,
}

/// Finds one batch code in fetched HTML or similar text.
#[derive(Debug, Clone)]
pub struct MarkupScanner {
    structured_data: bool,
}

impl MarkupScanner {
    /// Create a scanner with every stage enabled.
    pub fn new() -> Self {
        Self {
            structured_data: true,
        }
    }

    /// Enable or disable the linked-data stage.
    pub fn with_structured_data(mut self, enabled: bool) -> Self {
        self.structured_data = enabled;
        self
    }

    /// Stages this scanner will run, in order.
    pub fn stages(&self) -> impl Iterator<Item = MarkupStage> + '_ {
        MarkupStage::ORDER
            .into_iter()
            .filter(|stage| self.structured_data || *stage != MarkupStage::StructuredData)
    }

    /// Try each stage in order and stop at the first hit.
    pub fn scan(&self, content: &str) -> Option<MarkupHit> {
        let upper = content.to_uppercase();

        for stage in self.stages() {
            if let Some(code) = stage.run(content, &upper) {
                debug!("Markup stage {:?} found {}", stage, code);
                return Some(MarkupHit { code, stage });
            }
            trace!("Markup stage {:?} found nothing", stage);
        }

        None
    }
}

impl Default for MarkupScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(content: &str) -> Option<(String, MarkupStage)> {
        MarkupScanner::new()
            .scan(content)
            .map(|hit| (hit.code.to_string(), hit.stage))
    }

    #[test]
    fn test_direct_match() {
        assert_eq!(
            scan("<div>Code: 5QWERTYUIO</div>"),
            Some(("5QWERTYUIO".to_string(), MarkupStage::DirectPattern))
        );
        // Lower-case markup is upper-cased first.
        assert_eq!(
            scan("<span>lot 5qwertyuio</span>"),
            Some(("5QWERTYUIO".to_string(), MarkupStage::DirectPattern))
        );
    }

    #[test]
    fn test_data_batch_attribute() {
        assert_eq!(
            scan(r#"<div data-batch="5ZZZ111222"></div>"#).map(|(c, _)| c),
            Some("5ZZZ111222".to_string())
        );
    }

    #[test]
    fn test_keyed_pattern_when_direct_fails() {
        // The code is glued to a trailing underscore, so the bounded
        // direct pattern rejects it.
        assert_eq!(
            scan("batch:5ABC123DEF_x"),
            Some(("5ABC123DEF".to_string(), MarkupStage::KeyedPattern))
        );
        assert_eq!(
            scan("批次5ABC123DEF_"),
            Some(("5ABC123DEF".to_string(), MarkupStage::KeyedPattern))
        );
    }

    #[test]
    fn test_direct_stage_runs_first() {
        assert_eq!(
            scan(r#"<input id="batch" type="hidden" value="5ABC123DEF"/>"#),
            Some(("5ABC123DEF".to_string(), MarkupStage::DirectPattern))
        );
    }

    #[test]
    fn test_structured_data_stage() {
        // The escaped `5` hides the code from every text pattern; only the
        // parsed block reveals it.
        let html = r#"<script type="application/ld+json">
            {"@type": "Product", "batchNumber": "\u0035ABC123DEF", "inStock": true}
        </script>"#;
        assert_eq!(
            scan(html),
            Some(("5ABC123DEF".to_string(), MarkupStage::StructuredData))
        );

        let disabled = MarkupScanner::new().with_structured_data(false);
        assert!(disabled.stages().all(|s| s != MarkupStage::StructuredData));
        assert_eq!(disabled.scan(html), None);
    }

    #[test]
    fn test_meta_tag_stage() {
        // The trailing underscore defeats the bounded direct pattern.
        assert_eq!(
            scan(r#"<head><meta name="batch" content="5MET4TAG00_"></head>"#),
            Some(("5MET4TAG00".to_string(), MarkupStage::MetaTag))
        );
        assert_eq!(
            scan(r#"<meta content="5abcdefghi_" name="batch">"#),
            Some(("5ABCDEFGHI".to_string(), MarkupStage::MetaTag))
        );
        // Other meta names are not batch codes.
        assert_eq!(scan(r#"<meta content="5abcdefghi_" name="sku">"#), None);
    }

    #[test]
    fn test_meta_tag_patterns() {
        let html = r#"<META NAME="BATCH" CONTENT="5MET4TAG00">"#;
        assert_eq!(
            first_capture(&META_BATCH, html).map(|c| c.to_string()),
            Some("5MET4TAG00".to_string())
        );
        let reversed = r#"<META CONTENT="5MET4TAG00" NAME="BATCH">"#;
        assert_eq!(
            first_capture(&META_BATCH_REVERSED, reversed).map(|c| c.to_string()),
            Some("5MET4TAG00".to_string())
        );
        assert_eq!(first_capture(&META_BATCH, r#"<META NAME="BATCH" CONTENT="5MET4TAG000">"#), None);
    }

    #[test]
    fn test_keyword_stage() {
        assert_eq!(
            scan("Batch Number: 5abcdefghi_"),
            Some(("5ABCDEFGHI".to_string(), MarkupStage::Keyword))
        );
        assert_eq!(
            scan("<p>Serial number: 5abc123def_</p>"),
            Some(("5ABC123DEF".to_string(), MarkupStage::Keyword))
        );
    }

    #[test]
    fn test_keyword_pattern() {
        assert_eq!(
            first_capture(&BATCH_KEYWORD, "生產批次：5ABC123DEF").map(|c| c.to_string()),
            Some("5ABC123DEF".to_string())
        );
        assert_eq!(
            first_capture(&BATCH_KEYWORD, "SERIAL NUMBER 5ABC123DEF.").map(|c| c.to_string()),
            Some("5ABC123DEF".to_string())
        );
        assert_eq!(first_capture(&BATCH_KEYWORD, "BATCH CODE: 5ABC123DEFG"), None);
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(scan("<html><body>No codes here, only 6123456789</body></html>"), None);
        assert_eq!(scan(""), None);
    }
}
