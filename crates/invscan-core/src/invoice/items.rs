//! Line-item table extraction.
//!
//! Best-effort and position based: the table starts after the first line
//! containing the marker (`Sr. No.` by default) and runs until a line without
//! digits. Cells are separated by runs of two or more whitespace characters and
//! mapped by column index:
//!
//! | index | field           | parse            |
//! |-------|-----------------|------------------|
//! | 0     | serial number   | ignored          |
//! | 1     | `description`   | verbatim         |
//! | 2     | `hsn_code`      | verbatim         |
//! | 3     | `qty`           | leading integer  |
//! | 4..=9 | `rate` .. `grand_total` | leading decimal |
//!
//! Rows with too few cells are dropped without ending the scan. Rows that pass
//! the minimum but are shorter than ten cells read the absent columns as
//! missing.

use tracing::debug;

use crate::models::invoice::LineItem;

use super::lines::has_digit;
use super::numbers::{parse_leading_decimal, parse_leading_int};
use super::patterns::CELL_SEPARATOR;
use super::{DEFAULT_MIN_FIELDS, DEFAULT_TABLE_MARKER};

/// An extracted row with its position in the normalized lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Zero-based index into the normalized lines.
    pub line: usize,
    pub item: LineItem,
}

/// A table row dropped for having too few cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    /// Zero-based index into the normalized lines.
    pub line: usize,
    /// Number of cells found.
    pub cells: usize,
}

/// Outcome of scanning one document for its item table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableScan {
    /// Index of the marker line, if one was found.
    pub marker_line: Option<usize>,
    /// Index of the digit-free line that ended the table, if any.
    pub end_line: Option<usize>,
    pub rows: Vec<ItemRow>,
    pub skipped: Vec<SkippedRow>,
}

impl TableScan {
    /// The extracted items in source order.
    pub fn into_items(self) -> Vec<LineItem> {
        self.rows.into_iter().map(|r| r.item).collect()
    }
}

/// Extracts line items from normalized lines.
#[derive(Debug, Clone)]
pub struct LineItemExtractor {
    marker: String,
    min_fields: usize,
}

impl LineItemExtractor {
    /// Create an extractor with the default marker and minimum cell count.
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_TABLE_MARKER.to_string(),
            min_fields: DEFAULT_MIN_FIELDS,
        }
    }

    /// Set the literal text that marks the table header line.
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the minimum number of cells a row needs to become an item.
    pub fn with_min_fields(mut self, min_fields: usize) -> Self {
        self.min_fields = min_fields;
        self
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn min_fields(&self) -> usize {
        self.min_fields
    }

    /// Scan for the item table and report what was kept and dropped.
    pub fn scan(&self, lines: &[&str]) -> TableScan {
        let mut scan = TableScan::default();

        let Some(marker_line) = lines.iter().position(|l| l.contains(self.marker.as_str())) else {
            debug!("No table marker {:?} found", self.marker);
            return scan;
        };
        scan.marker_line = Some(marker_line);

        for (idx, line) in lines.iter().enumerate().skip(marker_line + 1) {
            if !has_digit(line) {
                debug!("Item table ends at line {}: {:?}", idx, line);
                scan.end_line = Some(idx);
                break;
            }

            let cells: Vec<&str> = CELL_SEPARATOR.split(line).collect();
            if cells.len() < self.min_fields {
                debug!(
                    "Skipping line {}: {} cells, need {}",
                    idx,
                    cells.len(),
                    self.min_fields
                );
                scan.skipped.push(SkippedRow {
                    line: idx,
                    cells: cells.len(),
                });
                continue;
            }

            scan.rows.push(ItemRow {
                line: idx,
                item: row_to_item(&cells),
            });
        }

        debug!(
            "Item table: {} rows kept, {} skipped",
            scan.rows.len(),
            scan.skipped.len()
        );
        scan
    }

    /// Extract the items only.
    pub fn extract(&self, lines: &[&str]) -> Vec<LineItem> {
        self.scan(lines).into_items()
    }
}

impl Default for LineItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn row_to_item(cells: &[&str]) -> LineItem {
    let text = |i: usize| cells.get(i).map(|s| s.to_string()).unwrap_or_default();
    let decimal = |i: usize| cells.get(i).and_then(|s| parse_leading_decimal(s));

    LineItem {
        description: text(1),
        hsn_code: text(2),
        qty: cells.get(3).and_then(|s| parse_leading_int(s)),
        rate: decimal(4),
        taxable_value: decimal(5),
        igst_rate: decimal(6),
        igst_amount: decimal(7),
        total: decimal(8),
        grand_total: decimal(9),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::lines::normalize_lines;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const HEADER: &str =
        "Sr. No.  Description  HSN  Qty  Rate  Taxable  IGST%  IGSTAmt  Total  GrandTotal";

    fn dec(s: &str) -> Option<Decimal> {
        Some(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_single_row_until_digitless_line() {
        let text = format!(
            "{}\n1  Widget A  8471  10  100.00  1000.00  18  180.00  1180.00  1180.00\nSubtotal\n2  Ignored  1  1  1  1  1  1  1  1",
            HEADER
        );
        let lines = normalize_lines(&text);
        let scan = LineItemExtractor::new().scan(&lines);

        assert_eq!(scan.marker_line, Some(0));
        assert_eq!(scan.end_line, Some(2));
        assert_eq!(scan.rows.len(), 1);

        let item = &scan.rows[0].item;
        assert_eq!(item.description, "Widget A");
        assert_eq!(item.hsn_code, "8471");
        assert_eq!(item.qty, Some(10));
        assert_eq!(item.rate, dec("100.00"));
        assert_eq!(item.taxable_value, dec("1000.00"));
        assert_eq!(item.igst_rate, dec("18"));
        assert_eq!(item.igst_amount, dec("180.00"));
        assert_eq!(item.total, dec("1180.00"));
        assert_eq!(item.grand_total, dec("1180.00"));
    }

    #[test]
    fn test_short_row_skipped_scan_continues() {
        let text = format!(
            "{}\n1  Widget A  8471  10  100.00\n2  Widget B  8472  5  20.00  100.00  18  18.00  118.00  118.00",
            HEADER
        );
        let lines = normalize_lines(&text);
        let scan = LineItemExtractor::new().scan(&lines);

        assert_eq!(scan.skipped, vec![SkippedRow { line: 1, cells: 5 }]);
        assert_eq!(scan.rows.len(), 1);
        assert_eq!(scan.rows[0].line, 2);
        assert_eq!(scan.rows[0].item.description, "Widget B");
        assert_eq!(scan.end_line, None);
    }

    #[test]
    fn test_no_marker_yields_no_items() {
        let lines = normalize_lines("1  A  1  1  1  1  1  1  1  1\n2  B  1  1  1  1  1  1  1  1");
        let scan = LineItemExtractor::new().scan(&lines);
        assert_eq!(scan, TableScan::default());
    }

    #[test]
    fn test_marker_is_case_sensitive_substring() {
        let lines = normalize_lines("sr. no.  x\n1  A  1  1  1  1  1");
        assert!(LineItemExtractor::new().extract(&lines).is_empty());

        let lines = normalize_lines("Item list (Sr. No. first)\n1  A  1  1  1  1  1");
        assert_eq!(LineItemExtractor::new().extract(&lines).len(), 1);
    }

    #[test]
    fn test_seven_cell_row_reads_missing_columns() {
        let lines = normalize_lines("Sr. No.\n1  Bolt  7318  4  2.50  10.00  12");
        let items = LineItemExtractor::new().extract(&lines);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].igst_rate, dec("12"));
        assert_eq!(items[0].igst_amount, None);
        assert_eq!(items[0].total, None);
        assert_eq!(items[0].grand_total, None);
    }

    #[test]
    fn test_non_numeric_cells_are_sentinels() {
        let lines = normalize_lines("Sr. No.\n1  Nut  7318  ten  N/A  10.00  IGST  -  x  9 only");
        let item = &LineItemExtractor::new().extract(&lines)[0];

        assert_eq!(item.qty, None);
        assert_eq!(item.rate, None);
        assert_eq!(item.taxable_value, dec("10.00"));
        assert_eq!(item.igst_rate, None);
        assert_eq!(item.grand_total, dec("9"));
    }

    #[test]
    fn test_single_spaces_do_not_split() {
        let lines = normalize_lines("Sr. No.\n1 Widget A 8471 10 100.00 1000.00 18");
        let scan = LineItemExtractor::new().scan(&lines);
        assert!(scan.rows.is_empty());
        assert_eq!(scan.skipped, vec![SkippedRow { line: 1, cells: 1 }]);
    }

    #[test]
    fn test_marker_as_last_line() {
        let lines = normalize_lines("Header: x\nSr. No.  Description");
        let scan = LineItemExtractor::new().scan(&lines);
        assert_eq!(scan.marker_line, Some(1));
        assert!(scan.rows.is_empty());
    }

    #[test]
    fn test_custom_marker_and_minimum() {
        let extractor = LineItemExtractor::new().with_marker("S.No").with_min_fields(10);
        let lines = normalize_lines(
            "S.No  Item\n1  A  1  1  1  1  1\n2  B  1  1  1  1  1  1  1  1",
        );
        let items = extractor.extract(&lines);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].description, "B");
        assert_eq!(extractor.marker(), "S.No");
        assert_eq!(extractor.min_fields(), 10);
    }
}
