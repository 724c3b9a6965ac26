//! Image to invoice record: recognition followed by text parsing.

use tracing::{info, warn};

use crate::error::OcrError;
use crate::invoice::{ExtractionResult, InvoiceParser, TextInvoiceParser};
use crate::models::invoice::InvoiceRecord;
use crate::ocr::{Recognition, Recognizer};

/// Everything produced by scanning one image.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Raw recognizer output.
    pub recognition: Recognition,
    /// Parsed record with diagnostics.
    pub extraction: ExtractionResult,
}

impl ScanOutcome {
    pub fn record(&self) -> &InvoiceRecord {
        &self.extraction.record
    }

    pub fn text(&self) -> &str {
        &self.recognition.text
    }

    pub fn warnings(&self) -> &[String] {
        &self.extraction.warnings
    }

    /// Recognition plus parsing time in milliseconds.
    pub fn processing_time_ms(&self) -> u64 {
        self.recognition.processing_time_ms + self.extraction.processing_time_ms
    }
}

/// Runs a recognizer and hands its text to an invoice parser.
pub struct ScanPipeline<R, P = TextInvoiceParser> {
    recognizer: R,
    parser: P,
}

impl<R: Recognizer> ScanPipeline<R> {
    /// Pipeline with the default text parser.
    pub fn with_default_parser(recognizer: R) -> Self {
        Self::new(recognizer, TextInvoiceParser::new())
    }
}

impl<R: Recognizer, P: InvoiceParser> ScanPipeline<R, P> {
    pub fn new(recognizer: R, parser: P) -> Self {
        Self { recognizer, parser }
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Scan an encoded image.
    pub fn scan(&self, image: &[u8]) -> Result<ScanOutcome, OcrError> {
        self.scan_with_progress(image, &mut |_| {})
    }

    /// Scan an encoded image, forwarding the recognizer's progress.
    ///
    /// Only recognition can fail; a blank recognition still yields an
    /// (empty) record, with a warning.
    pub fn scan_with_progress(
        &self,
        image: &[u8],
        progress: &mut dyn FnMut(f32),
    ) -> Result<ScanOutcome, OcrError> {
        info!(
            "Scanning {} byte image with {}",
            image.len(),
            self.recognizer.name()
        );

        let recognition = self.recognizer.recognize_with_progress(image, progress)?;
        let mut extraction = self.parser.parse_with_report(&recognition.text);

        if recognition.is_blank() {
            warn!("{} recognized no text", self.recognizer.name());
            extraction
                .warnings
                .insert(0, "No text recognized in image".to_string());
        }

        Ok(ScanOutcome {
            recognition,
            extraction,
        })
    }
}
