//! Configuration structures for the scan pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for invscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvscanConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Invoice extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Local history document.
    pub history: HistoryConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Maximum image dimension (longer side) for processing.
    pub max_image_size: u32,

    /// Keep `[UNK]` glyph markers in recognized text instead of blanking them.
    pub keep_unknown_glyphs: bool,

    /// Drop recognized boxes below this confidence (0.0 - 1.0).
    pub min_confidence: f32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            max_image_size: 2048,
            keep_unknown_glyphs: false,
            min_confidence: 0.0,
        }
    }
}

/// Invoice extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Literal text marking the item table header line.
    pub table_marker: String,

    /// Minimum number of cells for a row to count as a line item.
    pub min_fields: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            table_marker: crate::invoice::DEFAULT_TABLE_MARKER.to_string(),
            min_fields: crate::invoice::DEFAULT_MIN_FIELDS,
        }
    }
}

/// Model file paths and download location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Base URL the model files can be downloaded from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_base_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            download_base_url: None,
        }
    }
}

impl ModelConfig {
    /// File names of every model the engine needs.
    pub fn files(&self) -> [&str; 3] {
        [
            self.detection_model.as_str(),
            self.recognition_model.as_str(),
            self.dictionary.as_str(),
        ]
    }

    /// Whether all model files are present in `model_dir`.
    pub fn is_complete(&self) -> bool {
        self.files()
            .iter()
            .all(|name| self.model_dir.join(name).is_file())
    }
}

/// Local history document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Path of the history JSON document.
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("image-to-text.json"),
        }
    }
}

impl InvscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Get full path to a model file.
    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.models.model_dir.join(model_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: InvscanConfig =
            serde_json::from_str(r#"{"extraction": {"min_fields": 10}}"#).unwrap();
        assert_eq!(config.extraction.min_fields, 10);
        assert_eq!(config.extraction.table_marker, "Sr. No.");
        assert_eq!(config.ocr.max_image_size, 2048);
        assert_eq!(config.models.detection_model, "det.onnx");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = InvscanConfig::default();
        config.models.download_base_url = Some("http://localhost:8080/models".to_string());
        config.save(&path).unwrap();

        let loaded = InvscanConfig::from_file(&path).unwrap();
        assert_eq!(
            loaded.models.download_base_url.as_deref(),
            Some("http://localhost:8080/models")
        );
        assert_eq!(loaded.history.path, PathBuf::from("image-to-text.json"));
    }

    #[test]
    fn test_invalid_config_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = InvscanConfig::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_model_files_complete() {
        let dir = tempfile::tempdir().unwrap();
        let mut models = ModelConfig {
            model_dir: dir.path().to_path_buf(),
            ..ModelConfig::default()
        };
        assert!(!models.is_complete());

        for name in ["det.onnx", "latin_rec.onnx", "latin_dict.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        assert!(models.is_complete());

        models.dictionary = "other.txt".to_string();
        assert!(!models.is_complete());
    }
}
