//! Recognizer backed by `pure-onnx-ocr`.

use std::path::Path;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info, warn};

use crate::error::OcrError;
use crate::models::config::{ModelConfig, OcrConfig};

use super::{ImageDecoder, Recognition, Recognizer, TextBox};

const UNKNOWN_GLYPH: &str = "[UNK]";

/// OCR engine backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    decoder: ImageDecoder,
    config: OcrConfig,
}

impl PureOcrEngine {
    /// Create an engine from the model files named in `models`.
    pub fn from_config(models: &ModelConfig, config: OcrConfig) -> Result<Self, OcrError> {
        Self::load(
            &models.model_dir,
            &models.detection_model,
            &models.recognition_model,
            &models.dictionary,
            config,
        )
    }

    /// Create an engine from the default model file names in a directory.
    pub fn from_dir(model_dir: &Path, config: OcrConfig) -> Result<Self, OcrError> {
        let models = ModelConfig {
            model_dir: model_dir.to_path_buf(),
            ..ModelConfig::default()
        };
        Self::from_config(&models, config)
    }

    fn load(
        model_dir: &Path,
        detection: &str,
        recognition: &str,
        dictionary: &str,
        config: OcrConfig,
    ) -> Result<Self, OcrError> {
        let det_path = model_dir.join(detection);
        let rec_path = model_dir.join(recognition);
        let dict_path = model_dir.join(dictionary);

        for path in [&det_path, &rec_path, &dict_path] {
            if !path.is_file() {
                return Err(OcrError::ModelLoad(format!(
                    "missing model file {}",
                    path.display()
                )));
            }
        }

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());

        Ok(Self {
            engine,
            decoder: ImageDecoder::new().with_max_size(config.max_image_size),
            config,
        })
    }

    fn clean_text(&self, text: &str) -> String {
        if self.config.keep_unknown_glyphs {
            text.to_string()
        } else {
            text.replace(UNKNOWN_GLYPH, " ")
        }
    }
}

impl Recognizer for PureOcrEngine {
    fn name(&self) -> &str {
        "pure-onnx-ocr"
    }

    fn recognize_with_progress(
        &self,
        image: &[u8],
        progress: &mut dyn FnMut(f32),
    ) -> Result<Recognition, OcrError> {
        let start = Instant::now();
        progress(0.0);

        let image = self.decoder.decode(image)?;
        let (width, height) = image.dimensions();
        progress(0.2);

        info!("Recognizing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(&image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;
        progress(0.9);

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<TextBox> = results
            .iter()
            .filter(|r| r.confidence >= self.config.min_confidence)
            .map(|r| TextBox {
                bbox: polygon_to_bbox(&r.bounding_box),
                text: self.clean_text(&r.text),
                confidence: r.confidence,
            })
            .collect();

        let dropped = results.len() - boxes.len();
        if dropped > 0 {
            debug!(
                "Dropped {} regions below confidence {}",
                dropped, self.config.min_confidence
            );
        }

        let recognition = Recognition::from_boxes(
            boxes,
            (width, height),
            start.elapsed().as_millis() as u64,
        );

        if recognition.is_blank() {
            warn!("No text recognized in {}x{} image", width, height);
        }

        info!(
            "OCR complete: {} text boxes in {}ms",
            recognition.boxes.len(),
            recognition.processing_time_ms
        );

        progress(1.0);
        Ok(recognition)
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}
