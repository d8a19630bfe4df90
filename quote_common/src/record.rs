//! Quote records and helpers for accepting them from users and files.
//!
//! A `QuoteRecord` is the unit of data kept by the record store: an identifier, the
//! display text and a free-form, case-sensitive category. Records coming from the
//! remote source are trusted as-is; records typed in by a user go through
//! [`validate_input`] first.
use std::io::Read;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// Category assigned to every record imported from the remote source.
pub const SERVER_CATEGORY: &str = "Server";

/// Message reported when a local add is missing its text or category.
pub const MISSING_FIELDS: &str = "Please fill both fields.";

/// A single quote.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRecord {
    /// Stable identifier, unique within the store.
    pub id: u64,
    /// Display text.
    pub text: String,
    /// Classification, compared exactly.
    pub category: String,
}

impl QuoteRecord {
    /// Creates a record from already-validated parts.
    pub fn new(id: u64, text: impl Into<String>, category: impl Into<String>) -> Self {
        QuoteRecord {
            id,
            text: text.into(),
            category: category.into(),
        }
    }

    /// Creates a record for a remote item, keeping the remote identifier.
    pub fn from_remote(id: u64, title: impl Into<String>) -> Self {
        QuoteRecord::new(id, title, SERVER_CATEGORY)
    }
}

/// Trims user input and rejects it when either field ends up empty.
///
/// Returns the trimmed `(text, category)` pair.
pub fn validate_input(text: &str, category: &str) -> Result<(String, String), SyncError> {
    let text = text.trim();
    let category = category.trim();
    if text.is_empty() || category.is_empty() {
        return Err(SyncError::Validation(MISSING_FIELDS.to_string()));
    }
    Ok((text.to_string(), category.to_string()))
}

/// Timestamp-derived candidate for a new local id.
pub fn timestamp_id() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Quotes a fresh install starts with, as `(text, category)` pairs.
pub const DEFAULT_QUOTES: [(&str, &str); 3] = [
    ("Peace begins with a smile.", "Life"),
    (
        "Code is like humor; when you have to explain it, it's bad.",
        "Programming",
    ),
    ("The purpose of life is to give it meaning.", "Life"),
];

/// Trait providing parsing of record collections.
pub trait RecordParser {
    /// Parses a JSON array of records from a reader.
    ///
    /// Returns an error if the payload is not a JSON array of `{id, text, category}` objects.
    fn parse_from_reader<R: Read>(reader: R) -> Result<Vec<QuoteRecord>, SyncError>;
}

impl RecordParser for QuoteRecord {
    fn parse_from_reader<R: Read>(reader: R) -> Result<Vec<Self>, SyncError> {
        let records: Vec<QuoteRecord> = serde_json::from_reader(reader)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_trims_both_fields() {
        let (text, category) = validate_input("  Stay hungry.  ", "\tLife\n").unwrap();
        assert_eq!(text, "Stay hungry.");
        assert_eq!(category, "Life");
    }

    #[test]
    fn validate_rejects_blank_fields() {
        for (text, category) in [("", "Life"), ("Quote", "   "), (" ", "")] {
            match validate_input(text, category) {
                Err(SyncError::Validation(msg)) => assert_eq!(msg, MISSING_FIELDS),
                other => panic!("expected validation failure, got {:?}", other),
            }
        }
    }

    #[test]
    fn remote_records_are_server_category() {
        let record = QuoteRecord::from_remote(7, "remote title");
        assert_eq!(record.id, 7);
        assert_eq!(record.category, SERVER_CATEGORY);
    }

    #[test]
    fn parses_json_array() {
        let json = r#"[{"id":1,"text":"A","category":"Life"},{"id":2,"text":"B","category":"Work"}]"#;
        let records = QuoteRecord::parse_from_reader(json.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], QuoteRecord::new(2, "B", "Work"));
    }

    #[test]
    fn rejects_records_without_id() {
        let json = r#"[{"text":"A","category":"Life"}]"#;
        assert!(QuoteRecord::parse_from_reader(json.as_bytes()).is_err());
    }
}
