//! Batch-code search inside embedded linked-data blocks.
//!
//! Blocks are parsed into `serde_json::Value` trees (insertion order kept)
//! and walked depth-first. At every object the likely key names are tried
//! first; only then are the remaining entries searched in document order.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::rules::{FieldExtractor, MatchRule, LINKED_DATA_BLOCK};
use crate::models::batch::BatchCode;

/// Keys checked before any other entry of an object, in this order.
///
/// Matching ignores ASCII case, so `BatchNumber` and `BATCH` also count.
pub const PRIORITY_KEYS: [&str; 10] = [
    "batch",
    "batchNumber",
    "batch_number",
    "serialNumber",
    "serial_number",
    "批次",
    "批次號",
    "批次号",
    "序列號",
    "序列号",
];

/// Raw contents of every `application/ld+json` script block, in order.
pub fn linked_data_blocks(content: &str) -> Vec<&str> {
    LINKED_DATA_BLOCK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .collect()
}

/// Parse each linked-data block and return the first batch code found.
///
/// Blocks that are not valid JSON are skipped.
pub fn scan_linked_data(content: &str) -> Option<BatchCode> {
    for (index, block) in linked_data_blocks(content).into_iter().enumerate() {
        let value: Value = match serde_json::from_str(block) {
            Ok(value) => value,
            Err(e) => {
                debug!("Skipping malformed linked-data block {}: {}", index + 1, e);
                continue;
            }
        };

        if let Some(code) = find_batch_code(&value) {
            trace!("Linked-data block {} yielded {}", index + 1, code);
            return Some(code);
        }
    }

    None
}

/// Depth-first search of a parsed tree for a batch code.
pub fn find_batch_code(value: &Value) -> Option<BatchCode> {
    match value {
        Value::Object(map) => search_object(map),
        Value::Array(items) => items.iter().find_map(find_batch_code),
        Value::String(s) => code_in_text(s),
        Value::Number(n) => code_in_text(&n.to_string()),
        Value::Bool(_) | Value::Null => None,
    }
}

fn is_priority_key(key: &str) -> bool {
    PRIORITY_KEYS.iter().any(|p| p.eq_ignore_ascii_case(key))
}

fn search_object(map: &Map<String, Value>) -> Option<BatchCode> {
    for priority in PRIORITY_KEYS {
        let hit = map
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(priority))
            .find_map(|(_, value)| find_batch_code(value));

        if hit.is_some() {
            return hit;
        }
    }

    map.iter()
        .filter(|(key, _)| !is_priority_key(key))
        .find_map(|(_, value)| find_batch_code(value))
}

fn code_in_text(text: &str) -> Option<BatchCode> {
    MatchRule::Primary
        .extract_all(&text.to_uppercase())
        .iter()
        .find_map(|candidate| candidate.validate())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn code(s: &str) -> Option<BatchCode> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn test_priority_key_beats_earlier_nested_value() {
        let value = json!({
            "name": "Widget",
            "offers": {"sku": "5XXXYYYZZZ"},
            "batchNumber": "5AAABBBCCC"
        });
        assert_eq!(find_batch_code(&value), code("5AAABBBCCC"));
    }

    #[test]
    fn test_priority_order_between_keys() {
        let value = json!({
            "serialNumber": "5SSSSSSSSS",
            "batch": "5BBBBBBBBB"
        });
        assert_eq!(find_batch_code(&value), code("5BBBBBBBBB"));
    }

    #[test]
    fn test_priority_key_case_and_cjk() {
        assert_eq!(find_batch_code(&json!({"BatchNumber": "5abc123def"})), code("5ABC123DEF"));
        assert_eq!(find_batch_code(&json!({"x": "no", "批次號": "5QWERTYUIO"})), code("5QWERTYUIO"));
    }

    #[test]
    fn test_priority_key_with_container_value() {
        let value = json!({
            "other": "5XXXYYYZZZ",
            "batch": {"id": "5AAABBBCCC"}
        });
        assert_eq!(find_batch_code(&value), code("5AAABBBCCC"));
    }

    #[test]
    fn test_falls_back_to_generic_scan() {
        let value = json!({
            "batch": "unknown",
            "@graph": [
                {"@type": "Organization", "name": "ACME"},
                {"@type": "Product", "description": "Lot 5LOT123456 packed 2024"}
            ]
        });
        assert_eq!(find_batch_code(&value), code("5LOT123456"));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(find_batch_code(&json!({"batch": 5123456789u64})), code("5123456789"));
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(find_batch_code(&json!({"a": [1, true, null], "b": "5SHORT"})), None);
    }

    #[test]
    fn test_scan_skips_malformed_blocks() {
        let html = r#"<html><head>
            <script type="application/ld+json">{ "batch": "5AAA" , </script>
            <script type="application/ld+json">
              {"@type": "Product", "batchNumber": "5AAABBBCCC", "inStock": true}
            </script>
        </head></html>"#;

        assert_eq!(linked_data_blocks(html).len(), 2);
        assert_eq!(scan_linked_data(html), code("5AAABBBCCC"));
    }

    #[test]
    fn test_ignores_other_scripts() {
        let html = r#"<script type="text/javascript">var data = {"batch": "5AAABBBCCC"};</script>"#;
        assert!(linked_data_blocks(html).is_empty());
        assert_eq!(scan_linked_data(html), None);
    }
}
