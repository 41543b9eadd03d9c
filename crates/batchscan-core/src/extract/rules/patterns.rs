//! Common regex patterns for batch-code extraction.
//!
//! Every pattern runs against upper-cased text. Word boundaries around the
//! primary pattern are checked by the matcher, not the regex, so that
//! CJK labels glued to a code do not hide it.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Contiguous code: 5 followed by nine [A-Z0-9]
    pub static ref BATCH_CODE: Regex = Regex::new(
        r"5[A-Z0-9]{9}"
    ).unwrap();

    // Backup: 5 123 456 789
    pub static ref DIGIT_GROUPS: Regex = Regex::new(
        r"5\s+[0-9]{3}\s+[0-9]{3}\s+[0-9]{3}"
    ).unwrap();

    // Backup: 5-ABC-DEF-GHI, 5 A1B 2C3 D4E
    pub static ref MIXED_GROUPS: Regex = Regex::new(
        r"5[\s\-]+[A-Z0-9]{3}[\s\-]+[A-Z0-9]{3}[\s\-]+[A-Z0-9]{3}"
    ).unwrap();

    // Separators removed when rebuilding a grouped code
    pub static ref GROUP_SEPARATOR: Regex = Regex::new(
        r"[\s\-]"
    ).unwrap();

    // Labelled codes in markup, tried in this order
    pub static ref KEYED_BATCH: Regex = Regex::new(
        r#"(?i)BATCH["']?\s*[:=]\s*["']?(5[A-Z0-9]{9})(?:[^A-Z0-9]|$)"#
    ).unwrap();

    pub static ref KEYED_BATCH_CJK: Regex = Regex::new(
        r#"批次["']?\s*[:：=]?\s*["']?(5[A-Z0-9]{9})(?:[^A-Z0-9]|$)"#
    ).unwrap();

    pub static ref KEYED_BATCH_NUMBER: Regex = Regex::new(
        r#"(?i)BATCH[\-_]NUMBER["']?\s*[:=]\s*["']?(5[A-Z0-9]{9})(?:[^A-Z0-9]|$)"#
    ).unwrap();

    pub static ref DATA_BATCH_ATTR: Regex = Regex::new(
        r#"(?i)DATA-BATCH\s*=\s*["']\s*(5[A-Z0-9]{9})\s*["']"#
    ).unwrap();

    pub static ref BATCH_INPUT_VALUE: Regex = Regex::new(
        r#"(?i)ID\s*=\s*["']BATCH["'][^>]*?VALUE\s*=\s*["']\s*(5[A-Z0-9]{9})\s*["']"#
    ).unwrap();

    // <script type="application/ld+json"> ... </script>, run on original-case content
    pub static ref LINKED_DATA_BLOCK: Regex = Regex::new(
        r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script\s*>"#
    ).unwrap();

    // <meta name="batch" content="...">
    pub static ref META_BATCH: Regex = Regex::new(
        r#"(?i)<META[^>]*\bNAME\s*=\s*["']BATCH["'][^>]*\bCONTENT\s*=\s*["']\s*(5[A-Z0-9]{9})(?:[^A-Z0-9]|$)"#
    ).unwrap();

    // <meta content="..." name="batch">
    pub static ref META_BATCH_REVERSED: Regex = Regex::new(
        r#"(?i)<META[^>]*\bCONTENT\s*=\s*["']\s*(5[A-Z0-9]{9})(?:[^A-Z0-9>][^>]*)?\bNAME\s*=\s*["']BATCH["']"#
    ).unwrap();

    // Descriptive labels directly in front of a code
    pub static ref BATCH_KEYWORD: Regex = Regex::new(
        r"(?i)(?:生產批次|生产批次|批次號|批次号|BATCH\s+NUMBER|SERIAL\s+NUMBER|PRODUCT\s+BATCH|BATCH\s+ID|BATCH\s+CODE)\s*[:：]?\s*(5[A-Z0-9]{9})(?:[^A-Z0-9]|$)"
    ).unwrap();
}
