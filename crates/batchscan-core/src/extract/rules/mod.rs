//! Rule-based candidate extraction.

pub mod matcher;
pub mod patterns;

pub use matcher::{line_candidates, MatchRule};
pub use patterns::*;

/// Trait for pattern-driven extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all non-overlapping occurrences, in source order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}
