//! Confidence ranking over an OCR transcript.

use std::fmt::Write;

use tracing::{debug, trace};

use super::rules::{line_candidates, FieldExtractor, MatchRule};
use crate::models::batch::{BatchCode, Candidate, ExtractionResult};
use crate::models::config::ExtractionConfig;
use crate::ocr::OcrTranscript;

/// Header line of every OCR raw-text transcript.
pub const RAW_TEXT_HEADER: &str = "--- Recognized text ---\n\n";

/// Picks the single best batch code out of one OCR pass.
#[derive(Debug, Clone)]
pub struct ConfidenceRanker {
    /// Line confidence used when the engine gave no token for a line.
    default_line_confidence: f64,
    /// Engine confidence required by the whole-document fallback.
    document_confidence_floor: f64,
}

impl ConfidenceRanker {
    /// Create a ranker with default settings.
    pub fn new() -> Self {
        Self {
            default_line_confidence: 50.0,
            document_confidence_floor: 30.0,
        }
    }

    /// Create a ranker from extraction configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_default_line_confidence(config.default_line_confidence)
            .with_document_confidence_floor(config.document_confidence_floor)
    }

    /// Set the confidence assumed for lines without a token score.
    pub fn with_default_line_confidence(mut self, confidence: f64) -> Self {
        self.default_line_confidence = confidence;
        self
    }

    /// Set the engine confidence the document fallback must exceed.
    pub fn with_document_confidence_floor(mut self, floor: f64) -> Self {
        self.document_confidence_floor = floor;
        self
    }

    /// Rank every candidate in the transcript and return the winner.
    ///
    /// A candidate replaces the running best only when its line confidence
    /// is strictly higher, so ties keep the earlier line. When no line
    /// yields anything, the whole document is scanned once more with the
    /// full rule cascade, gated only by the engine's overall confidence.
    pub fn rank(&self, transcript: &OcrTranscript) -> ExtractionResult {
        let lines = transcript.lines();

        let mut raw_text = String::from(RAW_TEXT_HEADER);
        let mut best: Option<BatchCode> = None;
        let mut best_confidence = 0.0;

        for (index, line) in lines.iter().enumerate() {
            let _ = writeln!(raw_text, "Line {}: {}", index + 1, line);

            for candidate in self.scored_line_candidates(transcript, index, line) {
                let Some(code) = candidate.validate() else {
                    continue;
                };
                let confidence = candidate.confidence.unwrap_or(self.default_line_confidence);

                if confidence > best_confidence {
                    trace!(
                        "Line {} candidate {} ({:?}) takes the lead at {:.1}",
                        index + 1,
                        code,
                        candidate.origin,
                        confidence
                    );
                    best = Some(code);
                    best_confidence = confidence;
                }
            }
        }

        if best.is_none() {
            best = self.scan_document(transcript);
        }

        debug!(
            "Ranked {} lines, best: {:?} at {:.1}",
            lines.len(),
            best.as_ref().map(BatchCode::as_str),
            best_confidence
        );

        ExtractionResult::new(best, Some(best_confidence), raw_text)
    }

    /// Every line candidate of the transcript, in source order, scored with
    /// its line confidence.
    pub fn candidates(&self, transcript: &OcrTranscript) -> Vec<Candidate> {
        transcript
            .lines()
            .iter()
            .enumerate()
            .flat_map(|(index, line)| self.scored_line_candidates(transcript, index, line))
            .collect()
    }

    fn scored_line_candidates(
        &self,
        transcript: &OcrTranscript,
        index: usize,
        line: &str,
    ) -> Vec<Candidate> {
        let confidence = transcript.line_confidence(index, self.default_line_confidence);
        line_candidates(line)
            .into_iter()
            .map(|candidate| candidate.with_confidence(confidence))
            .collect()
    }

    /// Whole-document fallback: rule by rule, then match by match.
    fn scan_document(&self, transcript: &OcrTranscript) -> Option<BatchCode> {
        if !(transcript.confidence > self.document_confidence_floor) {
            trace!(
                "Engine confidence {:.1} does not exceed {:.1}, skipping document scan",
                transcript.confidence,
                self.document_confidence_floor
            );
            return None;
        }

        let document = transcript.normalized_document();

        let found = MatchRule::CASCADE.iter().find_map(|rule| {
            rule.extract_all(&document)
                .iter()
                .find_map(|candidate| candidate.validate())
        });

        if let Some(code) = &found {
            debug!("Document scan recovered {}", code);
        }

        found
    }
}

impl Default for ConfidenceRanker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::batch::CandidateOrigin;
    use pretty_assertions::assert_eq;

    fn code(s: &str) -> Option<BatchCode> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_highest_confidence_line_wins() {
        let transcript = OcrTranscript::new("INVOICE\n5ABCDEFGHJ\nTOTAL: 100", 85.0)
            .with_token_confidences(&[0.4, 0.9, 0.6]);
        let result = ConfidenceRanker::new().rank(&transcript);

        assert!(result.found);
        assert_eq!(result.batch, code("5ABCDEFGHJ"));
        assert_eq!(result.confidence, Some(90.0));
    }

    #[test]
    fn test_candidates_carry_line_confidence() {
        let transcript = OcrTranscript::new("5AAAAAAAAA\nNOTHING\n5 123 456 789", 85.0)
            .with_token_confidences(&[0.75, 0.25]);
        let candidates = ConfidenceRanker::new().candidates(&transcript);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].value, "5AAAAAAAAA");
        assert_eq!(candidates[0].confidence, Some(75.0));
        assert_eq!(candidates[1].value, "5123456789");
        assert_eq!(candidates[1].origin, CandidateOrigin::DigitGroups);
        // No token for the third line.
        assert_eq!(candidates[1].confidence, Some(50.0));
    }

    #[test]
    fn test_later_line_with_higher_confidence_replaces() {
        let transcript = OcrTranscript::new("5AAAAAAAAA\n5BBBBBBBBB", 85.0)
            .with_token_confidences(&[0.5, 0.75]);
        let result = ConfidenceRanker::new().rank(&transcript);

        assert_eq!(result.batch, code("5BBBBBBBBB"));
        assert_eq!(result.confidence, Some(75.0));
    }

    #[test]
    fn test_ties_keep_earlier_line() {
        let transcript = OcrTranscript::new("5AAAAAAAAA\n5BBBBBBBBB", 85.0)
            .with_token_confidences(&[0.75, 0.75]);
        let result = ConfidenceRanker::new().rank(&transcript);
        assert_eq!(result.batch, code("5AAAAAAAAA"));

        // Without tokens every line gets the same default.
        let bare = OcrTranscript::new("5AAAAAAAAA\n5BBBBBBBBB", 85.0);
        assert_eq!(ConfidenceRanker::new().rank(&bare).batch, code("5AAAAAAAAA"));
    }

    #[test]
    fn test_two_codes_on_one_line() {
        let transcript = OcrTranscript::new("5AAAAAAAAA 5BBBBBBBBB", 85.0);
        let result = ConfidenceRanker::new().rank(&transcript);
        assert_eq!(result.batch, code("5AAAAAAAAA"));
        assert_eq!(result.confidence, Some(50.0));
    }

    #[test]
    fn test_backup_pattern_on_line() {
        let transcript = OcrTranscript::new("ITEM\n5 123 456 789", 85.0);
        let result = ConfidenceRanker::new().rank(&transcript);
        assert_eq!(result.batch, code("5123456789"));
    }

    #[test]
    fn test_no_match() {
        let transcript = OcrTranscript::new("HELLO WORLD", 80.0);
        let result = ConfidenceRanker::new().rank(&transcript);

        assert!(!result.found);
        assert_eq!(result.batch, None);
        assert_eq!(result.confidence, Some(0.0));
        assert_eq!(result.raw_text, format!("{}Line 1: HELLO WORLD\n", RAW_TEXT_HEADER));
    }

    #[test]
    fn test_empty_transcript() {
        let result = ConfidenceRanker::new().rank(&OcrTranscript::new("", 0.0));
        assert!(!result.found);
        assert_eq!(result.confidence, Some(0.0));
        assert_eq!(result.raw_text, RAW_TEXT_HEADER);

        let blank = ConfidenceRanker::new().rank(&OcrTranscript::new(" \n\n \t", 99.0));
        assert!(!blank.found);
        assert_eq!(blank.raw_text, RAW_TEXT_HEADER);
    }

    #[test]
    fn test_document_fallback_joins_lines() {
        let transcript = OcrTranscript::new("5 123\n456 789", 80.0);
        let result = ConfidenceRanker::new().rank(&transcript);

        assert!(result.found);
        assert_eq!(result.batch, code("5123456789"));
        // The fallback does not set a line confidence.
        assert_eq!(result.confidence, Some(0.0));
        assert!(result.raw_text.contains("Line 1: 5 123\n"));
        assert!(result.raw_text.contains("Line 2: 456 789\n"));
    }

    #[test]
    fn test_document_fallback_requires_engine_confidence() {
        let transcript = OcrTranscript::new("5 123\n456 789", 30.0);
        assert!(!ConfidenceRanker::new().rank(&transcript).found);

        let lowered = ConfidenceRanker::new().with_document_confidence_floor(10.0);
        assert!(lowered.rank(&transcript).found);
    }

    #[test]
    fn test_zero_confidence_line_falls_through_to_document() {
        let transcript = OcrTranscript::new("5ABCDEFGHI", 20.0).with_token_confidences(&[0.0]);
        assert!(!ConfidenceRanker::new().rank(&transcript).found);

        let confident = OcrTranscript::new("5ABCDEFGHI", 70.0).with_token_confidences(&[0.0]);
        let result = ConfidenceRanker::new().rank(&confident);
        assert_eq!(result.batch, code("5ABCDEFGHI"));
    }

    #[test]
    fn test_rank_is_idempotent() {
        let transcript = OcrTranscript::new("LOT\n5-ABC-DEF-GHI\n5QWERTYUIO", 77.0)
            .with_token_confidences(&[0.3, 0.6, 0.6]);
        let ranker = ConfidenceRanker::new();
        assert_eq!(ranker.rank(&transcript), ranker.rank(&transcript));
    }
}
