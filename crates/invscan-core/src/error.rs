//! Error types for the invscan-core library.
//!
//! Invoice text parsing has no error type: it degrades to partial or empty
//! records instead of failing. Everything here belongs to the layers around it
//! (recognition, configuration and the history document). Undecodable images
//! are reported by recognition as [`OcrError::InvalidImage`].

use thiserror::Error;

/// Main error type for the invscan library.
#[derive(Error, Debug)]
pub enum InvscanError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// History document error.
    #[error("history error: {0}")]
    History(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The recognizer ran but could not produce text.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// Input bytes are not a decodable image.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

impl OcrError {
    /// Whether this is a recognition failure as opposed to a setup or input problem.
    pub fn is_recognition_failure(&self) -> bool {
        matches!(self, OcrError::Recognition(_))
    }
}

/// Result type for the invscan library.
pub type Result<T> = std::result::Result<T, InvscanError>;
