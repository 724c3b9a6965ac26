//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod history;
pub mod models;
pub mod process;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use invscan_core::invoice::{ExtractionResult, InvoiceParser, TextInvoiceParser};
use invscan_core::models::config::{InvscanConfig, ModelConfig};
use invscan_core::{PureOcrEngine, ScanPipeline};

/// Image extensions handed to the OCR engine.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invscan")
        .join("config.json")
}

/// Load the configuration from `--config`, else the default location, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvscanConfig> {
    if let Some(path) = config_path {
        return Ok(InvscanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(InvscanConfig::from_file(&default_path)?)
    } else {
        Ok(InvscanConfig::default())
    }
}

/// Resolve a configured path: relative paths live under the user data directory.
pub fn data_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("invscan")
            .join(path)
    }
}

/// Model settings with the directory resolved and an optional override applied.
pub fn model_config(config: &InvscanConfig, model_dir: Option<PathBuf>) -> ModelConfig {
    ModelConfig {
        model_dir: model_dir.unwrap_or_else(|| data_path(&config.models.model_dir)),
        ..config.models.clone()
    }
}

/// What kind of input a file is, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Already-recognized text.
    Text,
    /// Image to run through OCR.
    Image,
}

impl InputKind {
    pub fn of(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if extension == "txt" {
            Some(Self::Text)
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            Some(Self::Image)
        } else {
            None
        }
    }
}

/// Extraction of one input file.
pub struct Extracted {
    pub extraction: ExtractionResult,
    /// Encoded image bytes when the input was an image.
    pub image: Option<Vec<u8>>,
}

/// Turns input files into invoice records, loading the OCR engine on first use.
pub struct Extractor {
    models: ModelConfig,
    config: InvscanConfig,
    parser: TextInvoiceParser,
    pipeline: Option<ScanPipeline<PureOcrEngine>>,
}

impl Extractor {
    pub fn new(config: &InvscanConfig, model_dir: Option<PathBuf>) -> Self {
        Self {
            models: model_config(config, model_dir),
            config: config.clone(),
            parser: TextInvoiceParser::from_config(&config.extraction),
            pipeline: None,
        }
    }

    /// Extract a record from `path`, reporting progress in `0.0..=1.0`.
    pub fn extract(
        &mut self,
        path: &Path,
        progress: &mut dyn FnMut(f32),
    ) -> anyhow::Result<Extracted> {
        match InputKind::of(path) {
            Some(InputKind::Text) => {
                let text = fs::read_to_string(path)?;
                progress(1.0);
                Ok(Extracted {
                    extraction: self.parser.parse_with_report(&text),
                    image: None,
                })
            }
            Some(InputKind::Image) => {
                let bytes = fs::read(path)?;
                let outcome = self.pipeline()?.scan_with_progress(&bytes, progress)?;
                debug!(
                    "OCR found {} text boxes in {}ms",
                    outcome.recognition.boxes.len(),
                    outcome.recognition.processing_time_ms
                );
                Ok(Extracted {
                    extraction: outcome.extraction,
                    image: Some(bytes),
                })
            }
            None => anyhow::bail!("Unsupported file format: {}", path.display()),
        }
    }

    fn pipeline(&mut self) -> anyhow::Result<&ScanPipeline<PureOcrEngine>> {
        let pipeline = match self.pipeline.take() {
            Some(pipeline) => pipeline,
            None => {
                if !self.models.is_complete() {
                    anyhow::bail!(
                        "OCR models not found at {}.\n\n\
                         Run 'invscan models download' to fetch them.",
                        self.models.model_dir.display()
                    );
                }
                debug!("Loading OCR models from {}", self.models.model_dir.display());
                let engine = PureOcrEngine::from_config(&self.models, self.config.ocr.clone())
                    .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
                ScanPipeline::new(engine, self.parser.clone())
            }
        };
        Ok(self.pipeline.insert(pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kind() {
        assert_eq!(InputKind::of(Path::new("a.txt")), Some(InputKind::Text));
        assert_eq!(InputKind::of(Path::new("scan.JPG")), Some(InputKind::Image));
        assert_eq!(InputKind::of(Path::new("scan.webp")), Some(InputKind::Image));
        assert_eq!(InputKind::of(Path::new("invoice.pdf")), None);
        assert_eq!(InputKind::of(Path::new("noext")), None);
    }

    #[test]
    fn test_data_path_keeps_absolute() {
        let abs = std::env::temp_dir().join("history.json");
        assert_eq!(data_path(&abs), abs);
        assert!(data_path(Path::new("models")).ends_with("invscan/models"));
    }

    #[test]
    fn test_model_dir_override() {
        let config = InvscanConfig::default();
        let models = model_config(&config, Some(PathBuf::from("/opt/models")));
        assert_eq!(models.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(models.detection_model, config.models.detection_model);
    }
}
