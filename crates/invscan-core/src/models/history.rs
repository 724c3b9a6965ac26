//! Extraction history document.
//!
//! Mirrors the flat JSON document the image-to-text store keeps:
//! `{ "data": [...], "meta": { "total": n, "lastUpdated": ... } }`.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{InvscanError, Result};

/// File name used when an upload has none.
pub const UNTITLED: &str = "Untitled";

/// One recognized image and its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionEntry {
    /// Milliseconds since the Unix epoch at creation, as a string.
    pub id: String,

    /// Original file name.
    pub file_name: String,

    /// Recognized text.
    pub text: String,

    /// Creation time.
    pub timestamp: DateTime<Utc>,

    /// Source image as a `data:` URL, or empty.
    #[serde(default)]
    pub image_data: String,
}

impl ExtractionEntry {
    /// Create an entry stamped with `now`.
    pub fn new(
        file_name: impl Into<String>,
        text: impl Into<String>,
        image_data: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let file_name = file_name.into();
        Self {
            id: now.timestamp_millis().to_string(),
            file_name: if file_name.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                file_name
            },
            text: text.into(),
            timestamp: now,
            image_data: image_data.into(),
        }
    }

    /// Suggested file name when saving the text: `extracted-text-YYYY-MM-DD.txt`.
    pub fn download_file_name(&self) -> String {
        format!("extracted-text-{}.txt", self.timestamp.format("%Y-%m-%d"))
    }

    /// Whether `term` occurs in the text or the file name, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.text.to_lowercase().contains(&term) || self.file_name.to_lowercase().contains(&term)
    }
}

/// Encode image bytes as a `data:<mime>;base64,...` URL.
///
/// The MIME type is sniffed from the bytes; unknown formats fall back to
/// `application/octet-stream`.
pub fn image_data_url(bytes: &[u8]) -> String {
    let mime = image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Summary block of the history document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMeta {
    /// Number of entries.
    pub total: usize,

    /// Time of the last modification.
    pub last_updated: Option<DateTime<Utc>>,
}

/// The whole history document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionHistory {
    pub data: Vec<ExtractionEntry>,
    pub meta: HistoryMeta,
}

impl ExtractionHistory {
    /// Load a history document; a missing file yields an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No history at {}, starting empty", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvscanError::History(format!("{}: {}", path.display(), e)))
    }

    /// Write the document as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Append an entry and refresh the summary, returning the stored id.
    ///
    /// Ids are millisecond timestamps, so an id already in the document is
    /// bumped until it is unique.
    pub fn push(&mut self, mut entry: ExtractionEntry, now: DateTime<Utc>) -> String {
        while self.get(&entry.id).is_some() {
            entry.id = next_id(&entry.id);
        }
        let id = entry.id.clone();
        self.data.push(entry);
        self.touch(now);
        id
    }

    /// Remove the entry with `id`. Returns false, leaving the document as is,
    /// when no such entry exists.
    pub fn remove(&mut self, id: &str, now: DateTime<Utc>) -> bool {
        let Some(index) = self.data.iter().position(|e| e.id == id) else {
            return false;
        };
        self.data.remove(index);
        self.touch(now);
        true
    }

    /// Find an entry by id.
    pub fn get(&self, id: &str) -> Option<&ExtractionEntry> {
        self.data.iter().find(|e| e.id == id)
    }

    /// Entries whose text or file name contains `term`, ignoring case.
    /// An empty term matches everything.
    pub fn search(&self, term: &str) -> Vec<&ExtractionEntry> {
        if term.is_empty() {
            return self.data.iter().collect();
        }
        self.data.iter().filter(|e| e.matches(term)).collect()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.meta.total = self.data.len();
        self.meta.last_updated = Some(now);
    }
}

fn next_id(id: &str) -> String {
    match id.parse::<i64>() {
        Ok(n) => n.saturating_add(1).to_string(),
        Err(_) => format!("{}-1", id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_entry_defaults() {
        let entry = ExtractionEntry::new("", "hello", "", at(1_714_557_600));
        assert_eq!(entry.id, "1714557600000");
        assert_eq!(entry.file_name, UNTITLED);
        assert_eq!(entry.download_file_name(), "extracted-text-2024-05-01.txt");
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = ExtractionEntry::new("scan.png", "Total: 5", "data:image/png;base64,", at(0));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["fileName"], "scan.png");
        assert_eq!(json["imageData"], "data:image/png;base64,");
        assert!(json["timestamp"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
    }

    #[test]
    fn test_reads_store_document() {
        let doc = r#"{
            "data": [{
                "id": "1714557600000",
                "fileName": "bill.jpg",
                "text": "Invoice Number: 7",
                "timestamp": "2024-05-01T10:00:00.000Z",
                "imageData": ""
            }],
            "meta": { "total": 1, "lastUpdated": null }
        }"#;
        let history: ExtractionHistory = serde_json::from_str(doc).unwrap();
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.meta.last_updated, None);
        assert_eq!(history.get("1714557600000").unwrap().file_name, "bill.jpg");
    }

    #[test]
    fn test_push_and_remove_update_meta() {
        let mut history = ExtractionHistory::default();
        history.push(ExtractionEntry::new("a.png", "one", "", at(1)), at(1));
        history.push(ExtractionEntry::new("b.png", "two", "", at(2)), at(2));
        assert_eq!(history.meta.total, 2);
        assert_eq!(history.meta.last_updated, Some(at(2)));

        assert!(history.remove("1000", at(3)));
        assert_eq!(history.meta.total, 1);
        assert_eq!(history.meta.last_updated, Some(at(3)));

        assert!(!history.remove("missing", at(4)));
        assert_eq!(history.meta.last_updated, Some(at(3)));
    }

    #[test]
    fn test_same_millisecond_entries_stay_distinct() {
        let mut history = ExtractionHistory::default();
        history.push(ExtractionEntry::new("a.png", "one", "", at(5)), at(5));
        let id = history.push(ExtractionEntry::new("b.png", "two", "", at(5)), at(5));
        assert_eq!(id, "5001");

        let ids: Vec<&str> = history.data.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["5000", "5001"]);

        assert!(history.remove("5000", at(6)));
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.data[0].file_name, "b.png");
    }

    #[test]
    fn test_remove_takes_one_of_duplicate_ids() {
        let entry = ExtractionEntry::new("a.png", "one", "", at(5));
        let mut history = ExtractionHistory {
            data: vec![entry.clone(), entry],
            meta: HistoryMeta::default(),
        };

        assert!(history.remove("5000", at(6)));
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.meta.total, 1);
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id("1714557600000"), "1714557600001");
        assert_eq!(next_id("abc"), "abc-1");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let mut history = ExtractionHistory::default();
        history.push(ExtractionEntry::new("Receipt.png", "coffee", "", at(1)), at(1));
        history.push(ExtractionEntry::new("scan.png", "GST Invoice", "", at(2)), at(2));

        assert_eq!(history.search("").len(), 2);
        assert_eq!(history.search("invoice")[0].file_name, "scan.png");
        assert_eq!(history.search("RECEIPT")[0].text, "coffee");
        assert!(history.search("tea").is_empty());
    }

    #[test]
    fn test_load_missing_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let mut history = ExtractionHistory::load(&path).unwrap();
        assert!(history.data.is_empty());

        history.push(ExtractionEntry::new("x.png", "text", "", at(5)), at(5));
        history.save(&path).unwrap();

        let loaded = ExtractionHistory::load(&path).unwrap();
        assert_eq!(loaded, history);
    }

    #[test]
    fn test_load_corrupt_is_history_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "[]").unwrap();

        let err = ExtractionHistory::load(&path).unwrap_err();
        assert!(matches!(err, InvscanError::History(_)));
    }

    #[test]
    fn test_image_data_url() {
        let png_header = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert!(image_data_url(&png_header).starts_with("data:image/png;base64,iVBORw0KGgo"));
        assert_eq!(image_data_url(b"hi"), "data:application/octet-stream;base64,aGk=");
    }
}
