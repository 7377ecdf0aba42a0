use std::fmt;

use serde::{Deserialize, Serialize};

/// Reason recorded for every line the validator rejects.
pub const INVALID_REASON: &str = "Invalid address format";

/// A normalized (trimmed, lower-cased) address token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entry(String);

impl Entry {
    /// Normalize a raw line. Returns `None` for blank lines.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Entry {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidEntry {
    pub original_value: String,
    /// 1-based line number in the input.
    pub line_number: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStats {
    pub total_lines: usize,
    pub valid_count: usize,
    pub duplicate_count: usize,
    pub invalid_count: usize,
    pub estimated_upload_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Unique entries in first-seen order.
    pub valid_entries: Vec<Entry>,
    /// In-file repeats; distinct from entries the server later skips.
    pub duplicates: Vec<Entry>,
    pub invalid_entries: Vec<InvalidEntry>,
    pub stats: ProcessingStats,
}

impl ProcessingResult {
    /// Number of lines that reached classification.
    pub fn classified_lines(&self) -> usize {
        self.stats.valid_count + self.stats.duplicate_count + self.stats.invalid_count
    }
}
