//! Invoice text parsing.
//!
//! Turns raw OCR text into an [`InvoiceRecord`]: `label: value` lines become
//! header fields and the rows under the item table marker become line items.
//! Parsing never fails; unrecognized input yields a partial or empty record.

mod header;
mod items;
mod lines;
mod numbers;
mod parser;
pub mod patterns;

pub use header::{extract_header, normalize_key, parse_header_line};
pub use items::{ItemRow, LineItemExtractor, SkippedRow, TableScan};
pub use lines::{has_digit, normalize_lines};
pub use numbers::{parse_leading_decimal, parse_leading_int};
pub use parser::{ExtractionResult, TextInvoiceParser};

use chrono::{DateTime, Utc};

use crate::models::invoice::InvoiceRecord;

/// Text that marks the item table header line.
pub const DEFAULT_TABLE_MARKER: &str = "Sr. No.";

/// Fewest cells a table row needs to become a line item.
pub const DEFAULT_MIN_FIELDS: usize = 7;

/// Trait for invoice parsing.
///
/// Implementations are pure: no I/O and no shared mutable state, so one parser
/// can serve any number of threads.
pub trait InvoiceParser: Send + Sync {
    /// Parse invoice text into a record.
    fn parse(&self, text: &str) -> InvoiceRecord;

    /// Parse invoice text and report what was skipped along the way.
    fn parse_with_report(&self, text: &str) -> ExtractionResult {
        let start = Utc::now();
        let record = self.parse(text);
        ExtractionResult {
            record,
            raw_text: text.to_string(),
            warnings: Vec::new(),
            processing_time_ms: elapsed_ms(start),
        }
    }
}

// Wall clock rather than `Instant`, which is unavailable on wasm32.
fn elapsed_ms(start: DateTime<Utc>) -> u64 {
    (Utc::now() - start).num_milliseconds().max(0) as u64
}

/// Parse invoice text with the default table layout.
pub fn parse(text: &str) -> InvoiceRecord {
    TextInvoiceParser::new().parse(text)
}
