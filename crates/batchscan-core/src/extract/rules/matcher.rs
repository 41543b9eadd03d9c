//! Candidate matching for the canonical batch-code shape.

use regex::Regex;

use super::patterns::{BATCH_CODE, DIGIT_GROUPS, GROUP_SEPARATOR, MIXED_GROUPS};
use super::FieldExtractor;
use crate::models::batch::{Candidate, CandidateOrigin};

/// One recognition rule of the candidate cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRule {
    /// `5` + nine `[A-Z0-9]`, bounded by non-word characters or string edges.
    Primary,
    /// `5 123 456 789`.
    DigitGroups,
    /// `5-ABC-DEF-GHI`, separators may be whitespace or hyphens.
    MixedGroups,
}

impl MatchRule {
    /// Every rule, in cascade order.
    pub const CASCADE: [MatchRule; 3] = [Self::Primary, Self::DigitGroups, Self::MixedGroups];

    /// Rules tried when the primary rule finds nothing.
    pub const BACKUP: [MatchRule; 2] = [Self::DigitGroups, Self::MixedGroups];

    /// Origin recorded on candidates produced by this rule.
    pub fn origin(self) -> CandidateOrigin {
        match self {
            Self::Primary => CandidateOrigin::Primary,
            Self::DigitGroups => CandidateOrigin::DigitGroups,
            Self::MixedGroups => CandidateOrigin::MixedGroups,
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::Primary => &BATCH_CODE,
            Self::DigitGroups => &DIGIT_GROUPS,
            Self::MixedGroups => &MIXED_GROUPS,
        }
    }

    fn candidate(self, text: &str, start: usize, end: usize) -> Candidate {
        let source = &text[start..end];
        let value = match self {
            Self::Primary => source.to_string(),
            Self::DigitGroups | Self::MixedGroups => {
                GROUP_SEPARATOR.replace_all(source, "").into_owned()
            }
        };
        Candidate::new(value, self.origin(), source).with_position(start, end)
    }
}

impl FieldExtractor for MatchRule {
    type Output = Candidate;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        match self {
            Self::Primary => next_bounded(text, 0).map(|(s, e)| self.candidate(text, s, e)),
            _ => self
                .pattern()
                .find(text)
                .map(|m| self.candidate(text, m.start(), m.end())),
        }
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        match self {
            Self::Primary => {
                let mut results = Vec::new();
                let mut pos = 0;
                while let Some((start, end)) = next_bounded(text, pos) {
                    results.push(self.candidate(text, start, end));
                    pos = end;
                }
                results
            }
            _ => self
                .pattern()
                .find_iter(text)
                .map(|m| self.candidate(text, m.start(), m.end()))
                .collect(),
        }
    }
}

/// Candidates for a single transcript line.
///
/// All primary matches are returned in source order. Only when there are
/// none are the backup rules tried, stopping at the first one whose
/// candidate passes validation.
pub fn line_candidates(line: &str) -> Vec<Candidate> {
    let primary = MatchRule::Primary.extract_all(line);
    if !primary.is_empty() {
        return primary;
    }

    MatchRule::BACKUP
        .iter()
        .filter_map(|rule| rule.extract(line))
        .find(|candidate| candidate.validate().is_some())
        .into_iter()
        .collect()
}

/// ASCII word characters, matching `\b` semantics of the capture page.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Next primary match at or after `pos` with word boundaries on both sides.
fn next_bounded(text: &str, mut pos: usize) -> Option<(usize, usize)> {
    while let Some(m) = BATCH_CODE.find_at(text, pos) {
        if is_bounded(text, m.start(), m.end()) {
            return Some((m.start(), m.end()));
        }
        // '5' is one byte, so this stays on a char boundary.
        pos = m.start() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_primary_recognizes_canonical_codes() {
        for code in ["5123456789", "5ABCDEFGHI", "5A1B2C3D4E", "5000000000", "5ZZZZZZZZZ"] {
            let found = MatchRule::Primary.extract(code).unwrap();
            assert_eq!(found.value, code);
            assert!(found.validate().is_some());
        }
    }

    #[test]
    fn test_primary_word_boundaries() {
        let rule = MatchRule::Primary;
        assert_eq!(rule.extract("PRODUCT: 5123456789 LOT: ABC123").unwrap().value, "5123456789");
        assert_eq!(rule.extract("(5ABCDEFGHI)").unwrap().value, "5ABCDEFGHI");
        assert_eq!(rule.extract("批次號5ABCDEFGHI").unwrap().value, "5ABCDEFGHI");

        // Too long on either side
        assert!(rule.extract("51234567890").is_none());
        assert!(rule.extract("X5123456789").is_none());
        assert!(rule.extract("5123456789_").is_none());
        // Too short
        assert!(rule.extract("CODE: 512345678 STATUS: OK").is_none());
        // Wrong leading digit
        assert!(rule.extract("BATCH: 6123456789 TYPE: B").is_none());
        assert!(rule.extract("LOT: L123456789 STATUS: OK").is_none());
    }

    #[test]
    fn test_primary_retries_inside_rejected_run() {
        // The first 5 is glued to a letter; the code after the space is fine.
        let found = MatchRule::Primary.extract_all("A5123456789 5ABCDEFGHI");
        assert_eq!(values(&found), vec!["5ABCDEFGHI"]);
        assert_eq!(found[0].position, Some((12, 22)));
    }

    #[test]
    fn test_primary_finds_all_in_order() {
        let found = MatchRule::Primary.extract_all("5AAAAAAAAA 5BBBBBBBBB,5CCCCCCCCC");
        assert_eq!(values(&found), vec!["5AAAAAAAAA", "5BBBBBBBBB", "5CCCCCCCCC"]);
        assert!(found.iter().all(|c| c.origin == CandidateOrigin::Primary));
    }

    #[test]
    fn test_digit_groups_rebuilt() {
        let found = MatchRule::DigitGroups.extract("ITEM: 5 123 456 789 TYPE: A").unwrap();
        assert_eq!(found.value, "5123456789");
        assert_eq!(found.source, "5 123 456 789");
        assert_eq!(found.origin, CandidateOrigin::DigitGroups);
    }

    #[test]
    fn test_mixed_groups_rebuilt() {
        let found = MatchRule::MixedGroups.extract("NUMBER: 5-ABC-DEF-GHI STATUS: PASS").unwrap();
        assert_eq!(found.value, "5ABCDEFGHI");

        let spaced = MatchRule::MixedGroups.extract("5 - A1B  2C3 -D4E").unwrap();
        assert_eq!(spaced.value, "5A1B2C3D4E");
    }

    #[test]
    fn test_line_candidates_cascade() {
        assert_eq!(values(&line_candidates("5 123 456 789")), vec!["5123456789"]);
        assert_eq!(values(&line_candidates("5-ABC-DEF-GHI")), vec!["5ABCDEFGHI"]);
        // Primary wins; backups are not consulted.
        assert_eq!(
            values(&line_candidates("5ABCDEFGHI 5 123 456 789")),
            vec!["5ABCDEFGHI"]
        );
        assert!(line_candidates("HELLO WORLD").is_empty());
        assert!(line_candidates("5 12 34 56").is_empty());
    }

    #[test]
    fn test_backup_tolerates_long_separator_runs() {
        let found = MatchRule::MixedGroups.extract("5 \t-- ABC --- DEF - GHI").unwrap();
        assert_eq!(found.value, "5ABCDEFGHI");
        assert!(found.validate().is_some());
    }
}
