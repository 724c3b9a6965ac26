//! Invoice record produced from OCR text.
//!
//! The header is open-ended: its keys are only known once a document has been
//! read, so it is kept as a string map rather than a fixed struct.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Key under which line items are published in the flat JSON form.
pub const ITEMS_KEY: &str = "items";

/// Free-form header fields keyed by normalized label.
pub type HeaderFields = BTreeMap<String, String>;

/// A single row of the itemized goods/services table.
///
/// Numeric cells are `None` when the cell was missing or did not start with a
/// number. `None` serializes as JSON `null`; decimals serialize as JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product/service description.
    pub description: String,

    /// HSN (harmonized system of nomenclature) code, kept verbatim.
    pub hsn_code: String,

    /// Quantity.
    pub qty: Option<i64>,

    /// Unit rate.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub rate: Option<Decimal>,

    /// Taxable value for this line.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub taxable_value: Option<Decimal>,

    /// IGST rate in percent.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub igst_rate: Option<Decimal>,

    /// IGST amount for this line.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub igst_amount: Option<Decimal>,

    /// Line total.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub total: Option<Decimal>,

    /// Grand total column.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub grand_total: Option<Decimal>,
}

impl LineItem {
    /// Names of numeric cells that fell back to the non-numeric sentinel.
    pub fn missing_numbers(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.qty.is_none() {
            missing.push("qty");
        }
        let decimals = [
            ("rate", &self.rate),
            ("taxable_value", &self.taxable_value),
            ("igst_rate", &self.igst_rate),
            ("igst_amount", &self.igst_amount),
            ("total", &self.total),
            ("grand_total", &self.grand_total),
        ];
        for (name, value) in decimals {
            if value.is_none() {
                missing.push(name);
            }
        }
        missing
    }

    /// Whether every numeric cell parsed.
    pub fn is_complete(&self) -> bool {
        self.missing_numbers().is_empty()
    }
}

/// Structured result of parsing one document's OCR text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceRecord {
    /// Label/value pairs found anywhere in the text.
    pub header: HeaderFields,

    /// Line items in source order.
    pub items: Vec<LineItem>,
}

impl InvoiceRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a header value by normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.header.get(key).map(String::as_str)
    }

    /// True when neither header fields nor items were found.
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.items.is_empty()
    }

    /// Sum of the grand totals that parsed.
    pub fn grand_total_sum(&self) -> Decimal {
        self.items.iter().filter_map(|i| i.grand_total).sum()
    }

    /// Header keys as they appear in the flat JSON form (`items` is shadowed).
    fn visible_header(&self) -> impl Iterator<Item = (&String, &String)> {
        self.header.iter().filter(|(k, _)| k.as_str() != ITEMS_KEY)
    }
}

impl Serialize for InvoiceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let header_len = self.visible_header().count();
        let mut map = serializer.serialize_map(Some(header_len + 1))?;
        for (key, value) in self.visible_header() {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(ITEMS_KEY, &self.items)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for InvoiceRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;

        let items = match raw.remove(ITEMS_KEY) {
            Some(value) => serde_json::from_value(value).map_err(de::Error::custom)?,
            None => Vec::new(),
        };

        let header = raw
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(s) => Ok((key, s)),
                other => Err(de::Error::custom(format!(
                    "header field `{}` must be a string, got {}",
                    key, other
                ))),
            })
            .collect::<Result<HeaderFields, D::Error>>()?;

        Ok(Self { header, items })
    }
}

impl fmt::Display for InvoiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} header fields, {} line items",
            self.visible_header().count(),
            self.items.len()
        )
    }
}

/// Envelope the parser output is published in: `{ "invoice": { ... } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub invoice: InvoiceRecord,
}

impl From<InvoiceRecord> for InvoiceDocument {
    fn from(invoice: InvoiceRecord) -> Self {
        Self { invoice }
    }
}
