//! Configuration structures for extraction and the inventory API.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BatchscanError, Result};

/// Main configuration for batchscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchscanConfig {
    /// Extraction pipeline configuration.
    pub extraction: ExtractionConfig,

    /// Inventory API and fetch configuration.
    pub api: ApiConfig,
}

/// Extraction pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Confidence (0-100) assigned to a transcript line with no token score.
    pub default_line_confidence: f64,

    /// Overall engine confidence the whole-document fallback must exceed.
    pub document_confidence_floor: f64,

    /// Search embedded linked-data blocks when scanning markup.
    pub structured_data: bool,

    /// Characters of fetched content kept in previews and raw text.
    pub preview_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_line_confidence: 50.0,
            document_confidence_floor: 30.0,
            structured_data: true,
            preview_chars: 500,
        }
    }
}

/// Inventory API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the inventory server.
    pub base_url: String,

    /// User agent sent when fetching pages.
    pub user_agent: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            user_agent: "VAS-Batch-Identifier/1.0".to_string(),
            timeout_secs: 10,
        }
    }
}

impl BatchscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;
        for (name, value) in [
            ("extraction.default_line_confidence", extraction.default_line_confidence),
            ("extraction.document_confidence_floor", extraction.document_confidence_floor),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(BatchscanError::Config(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }

        if self.api.base_url.trim().is_empty() {
            return Err(BatchscanError::Config("api.base_url must not be empty".to_string()));
        }

        if self.api.timeout_secs == 0 {
            return Err(BatchscanError::Config("api.timeout_secs must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BatchscanConfig =
            serde_json::from_str(r#"{"extraction": {"document_confidence_floor": 60}}"#).unwrap();

        assert_eq!(config.extraction.document_confidence_floor, 60.0);
        assert_eq!(config.extraction.default_line_confidence, 50.0);
        assert!(config.extraction.structured_data);
        assert_eq!(config.api.user_agent, "VAS-Batch-Identifier/1.0");
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_validate_ranges() {
        assert!(BatchscanConfig::default().validate().is_ok());

        let mut config = BatchscanConfig::default();
        config.extraction.default_line_confidence = 120.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("default_line_confidence"));

        let mut config = BatchscanConfig::default();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(BatchscanError::Config(_))));
    }

    #[test]
    fn test_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(BatchscanConfig::from_file(&path), Err(BatchscanError::Json(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BatchscanConfig::default();
        config.api.base_url = "http://inventory.local:8080".to_string();
        config.extraction.structured_data = false;
        config.save(&path).unwrap();

        let loaded = BatchscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.api.base_url, "http://inventory.local:8080");
        assert!(!loaded.extraction.structured_data);
    }
}
