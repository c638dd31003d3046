//! Core domain types for franchise lookups.

use serde::{Deserialize, Serialize};

/// Sentinel stored in a [`DetailRecord`] field the page did not provide.
pub const UNKNOWN: &str = "N/A";

// ---------------------------------------------------------------------------
// DetailRecord
// ---------------------------------------------------------------------------

/// Structured fields extracted from one franchise page.
///
/// Every field is always present; a value the page lacks holds [`UNKNOWN`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    /// Original (English) title of the item.
    pub english_title: String,
    /// Release year, or a `YYYY-YYYY` range for series.
    pub year: String,
}

impl DetailRecord {
    /// A record with every field set to [`UNKNOWN`].
    pub fn unknown() -> Self {
        Self {
            english_title: UNKNOWN.to_string(),
            year: UNKNOWN.to_string(),
        }
    }
}

impl Default for DetailRecord {
    fn default() -> Self {
        Self::unknown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_record_uses_sentinel() {
        let record = DetailRecord::unknown();
        assert_eq!(record.english_title, "N/A");
        assert_eq!(record.year, UNKNOWN);
    }

    #[test]
    fn serializes_all_fields() {
        let record = DetailRecord {
            english_title: "The Matrix".into(),
            year: UNKNOWN.into(),
        };
        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"english_title":"The Matrix","year":"N/A"}"#);
    }
}
