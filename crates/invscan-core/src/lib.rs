//! Core library for invoice OCR processing.
//!
//! This crate provides:
//! - Invoice text parsing: `label: value` header fields and the line-item table
//! - A text recognition trait with a `pure-onnx-ocr` implementation
//! - A scan pipeline tying recognition and parsing together
//! - Configuration and the extraction history document

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{InvscanError, OcrError, Result};
pub use invoice::{ExtractionResult, InvoiceParser, TextInvoiceParser, normalize_key, parse};
pub use models::config::InvscanConfig;
pub use models::history::{ExtractionEntry, ExtractionHistory};
pub use models::invoice::{HeaderFields, InvoiceDocument, InvoiceRecord, LineItem};
pub use ocr::{Recognition, Recognizer, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{ScanOutcome, ScanPipeline};
