//! Rendering of extracted records.

use invscan_core::models::invoice::{InvoiceDocument, InvoiceRecord, LineItem};

/// Output format for extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON `{"invoice": ...}` document
    Json,
    /// CSV, one row per line item
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for batch outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

const ITEM_COLUMNS: [&str; 9] = [
    "description",
    "hsn_code",
    "qty",
    "rate",
    "taxable_value",
    "igst_rate",
    "igst_amount",
    "total",
    "grand_total",
];

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let document = InvoiceDocument::from(record.clone());
            Ok(serde_json::to_string_pretty(&document)?)
        }
        OutputFormat::Csv => format_csv(record),
        OutputFormat::Text => Ok(format_text(record)),
    }
}

fn cell<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn item_cells(item: &LineItem) -> [String; 9] {
    [
        item.description.clone(),
        item.hsn_code.clone(),
        cell(&item.qty),
        cell(&item.rate),
        cell(&item.taxable_value),
        cell(&item.igst_rate),
        cell(&item.igst_amount),
        cell(&item.total),
        cell(&item.grand_total),
    ]
}

fn format_csv(record: &InvoiceRecord) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(ITEM_COLUMNS)?;
    for item in &record.items {
        wtr.write_record(item_cells(item))?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord) -> String {
    let mut output = String::new();

    if record.header.is_empty() {
        output.push_str("No header fields found\n");
    } else {
        let width = record.header.keys().map(|k| k.len()).max().unwrap_or(0);
        for (key, value) in &record.header {
            output.push_str(&format!("{:<width$}  {}\n", key, value, width = width));
        }
    }
    output.push('\n');

    if record.items.is_empty() {
        output.push_str("No line items found\n");
        return output;
    }

    output.push_str(&format!("Items ({}):\n", record.items.len()));
    for (i, item) in record.items.iter().enumerate() {
        output.push_str(&format!(
            "  {:>2}. {} [{}] qty {} x {} = {}\n",
            i + 1,
            item.description,
            item.hsn_code,
            cell(&item.qty),
            cell(&item.rate),
            cell(&item.grand_total),
        ));
    }
    output.push_str(&format!("\nGrand total: {}\n", record.grand_total_sum()));

    output
}
