//! Image decoding ahead of recognition.

use image::{DynamicImage, GenericImageView};
use tracing::debug;

use crate::error::OcrError;

/// Decodes uploaded image bytes and caps their size for the recognizer.
///
/// No enhancement is applied; images whose longer side exceeds `max_size` are
/// scaled down keeping their aspect ratio.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    max_size: u32,
}

impl ImageDecoder {
    /// Create a decoder with the default 2048px cap.
    pub fn new() -> Self {
        Self { max_size: 2048 }
    }

    /// Set the maximum length of the longer side.
    pub fn with_max_size(mut self, size: u32) -> Self {
        self.max_size = size;
        self
    }

    /// Decode image bytes (PNG, JPEG, BMP, TIFF, WebP ...).
    pub fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, OcrError> {
        if bytes.is_empty() {
            return Err(OcrError::InvalidImage("empty input".to_string()));
        }

        let image = image::load_from_memory(bytes)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.calculate_resize_dimensions(width, height);
        if (new_width, new_height) == (width, height) {
            return Ok(image);
        }

        debug!(
            "Scaling image from {}x{} to {}x{}",
            width, height, new_width, new_height
        );
        Ok(image.resize_exact(
            new_width,
            new_height,
            image::imageops::FilterType::Lanczos3,
        ))
    }

    fn calculate_resize_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max_dim = width.max(height);

        if self.max_size == 0 || max_dim <= self.max_size {
            return (width, height);
        }

        let scale = self.max_size as f32 / max_dim as f32;
        let new_width = (width as f32 * scale) as u32;
        let new_height = (height as f32 * scale) as u32;

        (new_width.max(1), new_height.max(1))
    }
}

impl Default for ImageDecoder {
    fn default() -> Self {
        Self::new()
    }
}
