//! WASM bindings for invoice OCR text parsing.
//!
//! Text recognition runs in the browser; these bindings turn its output into
//! the structured `{ invoice: { ...header, items: [...] } }` document.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use invscan_core::invoice::{InvoiceParser, TextInvoiceParser};
use invscan_core::models::invoice::{InvoiceDocument, InvoiceRecord};
use invscan_core::ocr::{Recognition, TextBox};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Plain JS objects for maps and `null` for missing numbers.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse OCR text into `{ invoice: { ...header, items: [...] } }`.
#[wasm_bindgen]
pub fn parse_invoice(text: &str) -> Result<JsValue, JsValue> {
    to_js(&InvoiceDocument::from(invscan_core::parse(text)))
}

/// Normalize a header label into its record key, e.g. `Invoice No.` → `invoice_no_`.
#[wasm_bindgen]
pub fn normalize_key(label: &str) -> String {
    invscan_core::normalize_key(label)
}

/// Trimmed, non-empty lines of `text`, as the parser sees them.
#[wasm_bindgen]
pub fn normalize_lines(text: &str) -> js_sys::Array {
    invscan_core::invoice::normalize_lines(text)
        .into_iter()
        .map(JsValue::from_str)
        .collect()
}

#[derive(Serialize)]
struct ParseReport {
    invoice: InvoiceRecord,
    raw_text: String,
    warnings: Vec<String>,
    processing_time_ms: u64,
}

/// Invoice parser with a configurable item table layout.
#[wasm_bindgen]
pub struct InvoiceScanner {
    parser: TextInvoiceParser,
}

#[wasm_bindgen]
impl InvoiceScanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            parser: TextInvoiceParser::new(),
        }
    }

    /// Set the text that marks the item table header line.
    #[wasm_bindgen]
    pub fn set_table_marker(&mut self, marker: &str) {
        self.parser = std::mem::take(&mut self.parser).with_table_marker(marker);
    }

    /// Set the fewest cells a row needs to become a line item.
    #[wasm_bindgen]
    pub fn set_min_fields(&mut self, min_fields: usize) {
        self.parser = std::mem::take(&mut self.parser).with_min_fields(min_fields);
    }

    /// Parse text into the invoice document.
    #[wasm_bindgen]
    pub fn parse(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&InvoiceDocument::from(self.parser.parse(text)))
    }

    /// Parse text, also returning warnings about skipped rows and cells.
    #[wasm_bindgen]
    pub fn parse_with_report(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.parser.parse_with_report(text);

        to_js(&ParseReport {
            invoice: result.record,
            raw_text: result.raw_text,
            warnings: result.warnings,
            processing_time_ms: result.processing_time_ms,
        })
    }
}

impl Default for InvoiceScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR result from browser-side processing.
#[wasm_bindgen]
pub struct OcrResultJs {
    boxes: Vec<TextBox>,
    text: String,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            boxes: Vec::new(),
            text: String::new(),
        }
    }

    /// Add a text box to the result.
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn add_box(
        &mut self,
        text: &str,
        x1: f32, y1: f32,
        x2: f32, y2: f32,
        x3: f32, y3: f32,
        x4: f32, y4: f32,
        confidence: f32,
    ) {
        self.boxes.push(TextBox {
            text: text.to_string(),
            bbox: [x1, y1, x2, y2, x3, y3, x4, y4],
            confidence,
        });
    }

    /// Set the full text, overriding the boxes.
    #[wasm_bindgen]
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Get the full text.
    ///
    /// Without an explicit text, boxes are put in reading order and boxes on
    /// one row are joined as table cells.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        if self.text.is_empty() {
            Recognition::from_boxes(self.boxes.clone(), (0, 0), 0).text
        } else {
            self.text.clone()
        }
    }

    /// Parse this OCR result into the invoice document.
    #[wasm_bindgen]
    pub fn extract_invoice(&self) -> Result<JsValue, JsValue> {
        parse_invoice(&self.get_text())
    }
}

impl Default for OcrResultJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("Invoice Number"), "invoice_number");
        assert_eq!(normalize_key("GSTIN/UIN"), "gstin_uin");
    }

    #[wasm_bindgen_test]
    fn test_parse_invoice_object() {
        let value = parse_invoice("Invoice Number: INV-1").unwrap();
        let invoice = js_sys::Reflect::get(&value, &"invoice".into()).unwrap();
        let number = js_sys::Reflect::get(&invoice, &"invoice_number".into()).unwrap();
        assert_eq!(number.as_string().as_deref(), Some("INV-1"));

        let items = js_sys::Reflect::get(&invoice, &"items".into()).unwrap();
        assert_eq!(js_sys::Array::from(&items).length(), 0);
    }

    #[wasm_bindgen_test]
    fn test_scanner_custom_marker() {
        let mut scanner = InvoiceScanner::new();
        scanner.set_table_marker("#");
        let value = scanner
            .parse_with_report("#  Item\n1  Pen  9608  x  1  3  0")
            .unwrap();

        let warnings = js_sys::Reflect::get(&value, &"warnings".into()).unwrap();
        assert_eq!(js_sys::Array::from(&warnings).length(), 1);

        let invoice = js_sys::Reflect::get(&value, &"invoice".into()).unwrap();
        let items = js_sys::Array::from(&js_sys::Reflect::get(&invoice, &"items".into()).unwrap());
        let qty = js_sys::Reflect::get(&items.get(0), &"qty".into()).unwrap();
        assert!(qty.is_null());
        let rate = js_sys::Reflect::get(&items.get(0), &"rate".into()).unwrap();
        assert_eq!(rate.as_f64(), Some(1.0));
    }

    #[wasm_bindgen_test]
    fn test_ocr_result_rows() {
        let mut result = OcrResultJs::new();
        result.add_box("8471", 120.0, 30.0, 170.0, 30.0, 170.0, 40.0, 120.0, 40.0, 0.9);
        result.add_box("Widget", 60.0, 31.0, 110.0, 31.0, 110.0, 41.0, 60.0, 41.0, 0.9);
        result.add_box("Sr. No.", 0.0, 0.0, 50.0, 0.0, 50.0, 10.0, 0.0, 10.0, 0.9);
        assert_eq!(result.get_text(), "Sr. No.\nWidget  8471");

        result.set_text("Invoice Number: 3");
        assert_eq!(result.get_text(), "Invoice Number: 3");
    }

    #[wasm_bindgen_test]
    fn test_normalize_lines() {
        let lines = normalize_lines("  a \n\n b");
        assert_eq!(lines.length(), 2);
        assert_eq!(lines.get(1).as_string().as_deref(), Some("b"));
    }
}
