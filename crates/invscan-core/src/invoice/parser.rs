//! Invoice assembler: header fields plus the line-item table.

use chrono::Utc;
use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::invoice::InvoiceRecord;

use super::elapsed_ms;
use super::header::extract_header;
use super::items::{LineItemExtractor, TableScan};
use super::lines::normalize_lines;
use super::InvoiceParser;

/// Result of invoice extraction with diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice data.
    pub record: InvoiceRecord,
    /// Raw text the record was extracted from.
    pub raw_text: String,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Parses OCR text into an [`InvoiceRecord`].
///
/// Header extraction and the item table scan both run over the same
/// normalized lines, independently of each other.
#[derive(Debug, Clone, Default)]
pub struct TextInvoiceParser {
    items: LineItemExtractor,
}

impl TextInvoiceParser {
    /// Create a parser with the default table layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_table_marker(config.table_marker.clone())
            .with_min_fields(config.min_fields)
    }

    /// Set the literal text that marks the item table header.
    pub fn with_table_marker(mut self, marker: impl Into<String>) -> Self {
        self.items = self.items.with_marker(marker);
        self
    }

    /// Set the minimum number of cells for an item row.
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.items = self.items.with_min_fields(min_fields);
        self
    }

    fn assemble(&self, text: &str) -> (InvoiceRecord, TableScan) {
        let lines = normalize_lines(text);
        let header = extract_header(&lines);
        let scan = self.items.scan(&lines);
        let record = InvoiceRecord {
            header,
            items: scan.rows.iter().map(|r| r.item.clone()).collect(),
        };
        (record, scan)
    }

    fn warnings(&self, scan: &TableScan) -> Vec<String> {
        let mut warnings = Vec::new();

        if scan.marker_line.is_none() {
            warnings.push(format!(
                "No item table marker {:?} found; no line items extracted",
                self.items.marker()
            ));
        }

        for skipped in &scan.skipped {
            warnings.push(format!(
                "Line {}: {} cells, expected at least {}; row skipped",
                skipped.line + 1,
                skipped.cells,
                self.items.min_fields()
            ));
        }

        for row in &scan.rows {
            let missing = row.item.missing_numbers();
            if !missing.is_empty() {
                warnings.push(format!(
                    "Line {}: no number in {}",
                    row.line + 1,
                    missing.join(", ")
                ));
            }
        }

        warnings
    }
}

impl InvoiceParser for TextInvoiceParser {
    fn parse(&self, text: &str) -> InvoiceRecord {
        self.assemble(text).0
    }

    fn parse_with_report(&self, text: &str) -> ExtractionResult {
        let start = Utc::now();

        info!("Parsing invoice from {} characters of text", text.len());

        let (record, scan) = self.assemble(text);
        let warnings = self.warnings(&scan);

        debug!("Extracted {} with {} warnings", record, warnings.len());

        ExtractionResult {
            record,
            raw_text: text.to_string(),
            warnings,
            processing_time_ms: elapsed_ms(start),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::invoice::InvoiceDocument;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const INVOICE: &str = r#"
        TAX INVOICE
        Invoice Number: INV-2024-001
        Invoice Date: 12/03/2024
        GSTIN: 29ABCDE1234F1Z5

        Sr. No.  Description  HSN  Qty  Rate  Taxable  IGST%  IGSTAmt  Total  GrandTotal
        1  Widget A  8471  10  100.00  1000.00  18  180.00  1180.00  1180.00
        2  Cable  8544  2  50
        3  Adapter  8504  1  250.00  250.00  18  45.00  295.00  295.00
        Subtotal
        Amount in words: One Thousand Four Hundred Seventy Five
    "#;

    #[test]
    fn test_parse_invoice() {
        let record = TextInvoiceParser::new().parse(INVOICE);

        assert_eq!(record.get("invoice_number"), Some("INV-2024-001"));
        assert_eq!(record.get("invoice_date"), Some("12/03/2024"));
        assert_eq!(record.get("gstin"), Some("29ABCDE1234F1Z5"));
        assert_eq!(
            record.get("amount_in_words"),
            Some("One Thousand Four Hundred Seventy Five")
        );
        assert_eq!(record.header.len(), 4);

        let descriptions: Vec<&str> = record.items.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Widget A", "Adapter"]);
        assert_eq!(record.grand_total_sum(), Decimal::from_str("1475.00").unwrap());
    }

    #[test]
    fn test_parse_empty() {
        let record = TextInvoiceParser::new().parse("");
        assert!(record.header.is_empty());
        assert!(record.items.is_empty());

        let json = serde_json::to_value(InvoiceDocument::from(record)).unwrap();
        assert_eq!(json, serde_json::json!({ "invoice": { "items": [] } }));
    }

    #[test]
    fn test_report_warnings() {
        let result = TextInvoiceParser::new().parse_with_report(INVOICE);
        assert_eq!(
            result.warnings,
            vec!["Line 7: 5 cells, expected at least 7; row skipped".to_string()]
        );
        assert_eq!(result.raw_text, INVOICE);
        assert_eq!(result.record, TextInvoiceParser::new().parse(INVOICE));
    }

    #[test]
    fn test_report_missing_marker_and_sentinels() {
        let result = TextInvoiceParser::new().parse_with_report("Total: 5");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].starts_with("No item table marker \"Sr. No.\""));

        let result =
            TextInvoiceParser::new().parse_with_report("Sr. No.\n1  Bolt  7318  4  2.50  10.00  12");
        assert_eq!(
            result.warnings,
            vec!["Line 2: no number in igst_amount, total, grand_total".to_string()]
        );
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig {
            table_marker: "S.No".to_string(),
            min_fields: 3,
        };
        let record = TextInvoiceParser::from_config(&config).parse("S.No  Item\n1  Pen  9608");
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].hsn_code, "9608");
        assert_eq!(record.items[0].qty, None);
    }

    #[test]
    fn test_never_panics_on_odd_input() {
        let parser = TextInvoiceParser::new();
        let inputs = [
            "\u{0}\u{feff}::::",
            "Sr. No.",
            "Sr. No.\n\n\n",
            "Sr. No.\n1\t\t\t2",
            "ÄÖÜ: ✓\nSr. No.\n١  ٢",
            ":",
            "Sr. No.\n1  a  b  c  d  e  f  g  h  i  j  k  l",
            "Sr. No.\n1  x  y  9999999999999999999999  1e999999999999  -.  +  .e5  0",
        ];
        for input in inputs {
            let _ = parser.parse(input);
            let _ = parser.parse_with_report(input);
        }
    }

    #[test]
    fn test_table_rows_with_colons_also_feed_header() {
        let record = TextInvoiceParser::new()
            .parse("Sr. No.\n1  Fee: setup  9983  1  10  10  18  1.8  11.8  11.8");
        assert_eq!(record.get("1__fee"), Some("setup  9983  1  10  10  18  1.8  11.8  11.8"));
        assert_eq!(record.items[0].description, "Fee: setup");
    }
}
