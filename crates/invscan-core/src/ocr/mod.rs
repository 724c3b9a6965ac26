//! Text recognition adapters.
//!
//! The invoice parser only needs the recognized text; everything about how it
//! is produced sits behind the [`Recognizer`] trait.

mod decode;
#[cfg(feature = "native")]
mod pure_engine;

pub use decode::ImageDecoder;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Vertical distance under which two boxes count as the same text row.
const ROW_TOLERANCE: f32 = 15.0;

// Two spaces: enough to separate table cells for the item extractor.
const CELL_GAP: &str = "  ";

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of recognizing one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recognition {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text, one line per row of boxes.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl Recognition {
    /// Recognition that found nothing.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Build a result from unordered boxes.
    ///
    /// Box text is trimmed and empty boxes are dropped. The rest are grouped
    /// into rows (see [`group_rows`]); boxes on one row are joined with two
    /// spaces, the table cell separator, and rows are joined with newlines.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        for b in &mut boxes {
            let trimmed = b.text.trim();
            if trimmed.len() != b.text.len() {
                b.text = trimmed.to_string();
            }
        }
        boxes.retain(|b| !b.text.is_empty());

        let rows = group_rows(boxes);
        let text = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| b.text.as_str())
                    .collect::<Vec<_>>()
                    .join(CELL_GAP)
            })
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            boxes: rows.into_iter().flatten().collect(),
            text,
            processing_time_ms,
            image_size,
        }
    }

    /// Whether no text was recognized.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Group boxes into rows, top to bottom, each row ordered left to right.
///
/// A box joins the current row while its top lies within `ROW_TOLERANCE`
/// pixels of the row's topmost box. Rows are formed before ordering by x, so
/// a slightly skewed row keeps its column order.
pub fn group_rows(mut boxes: Vec<TextBox>) -> Vec<Vec<TextBox>> {
    boxes.sort_by(|a, b| a.rect().1.total_cmp(&b.rect().1));

    let mut rows: Vec<Vec<TextBox>> = Vec::new();
    let mut row_y = f32::NEG_INFINITY;

    for b in boxes {
        let (_, y, _, _) = b.rect();
        match rows.last_mut() {
            Some(row) if y - row_y < ROW_TOLERANCE => row.push(b),
            _ => {
                row_y = y;
                rows.push(vec![b]);
            }
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.rect().0.total_cmp(&b.rect().0));
    }

    rows
}

/// Optical character recognition over encoded image bytes.
pub trait Recognizer {
    /// Short engine name for logs and metadata.
    fn name(&self) -> &str;

    /// Recognize text, reporting progress as a fraction in `0.0..=1.0`.
    ///
    /// Reported values never decrease. Failures to read text out of a valid
    /// image are [`OcrError::Recognition`].
    fn recognize_with_progress(
        &self,
        image: &[u8],
        progress: &mut dyn FnMut(f32),
    ) -> Result<Recognition, OcrError>;

    /// Recognize text without progress reporting.
    fn recognize(&self, image: &[u8]) -> Result<Recognition, OcrError> {
        self.recognize_with_progress(image, &mut |_| {})
    }
}
