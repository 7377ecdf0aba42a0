use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
    Cancelled,
}

/// Server-side context correlating all batches of one import.
///
/// The remote service owns the authoritative copy; the uploader keeps a
/// mirror of the counters only for progress display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSession {
    pub session_id: String,
    pub survey_id: String,
    pub total_addresses: usize,
    pub processed_addresses: usize,
    pub total_batches: usize,
    pub completed_batches: usize,
    pub replace_mode: bool,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUploadResult {
    pub batch_index: usize,
    /// Entries the server stored.
    pub added: usize,
    /// Entries the server already held (store-level dedup).
    pub skipped: usize,
    pub errors: Vec<EntryError>,
}

impl BatchUploadResult {
    /// Result recorded for a batch whose every attempt failed.
    pub fn failed(batch_index: usize, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            batch_index,
            added: 0,
            skipped: 0,
            errors: vec![EntryError {
                value: None,
                message: message.into(),
                timestamp: at,
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FinalStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteSessionResponse {
    #[serde(default)]
    pub message: String,
    pub session_id: String,
    pub final_stats: FinalStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSummary {
    pub total_processed: usize,
    pub total_added: usize,
    pub total_skipped: usize,
    pub total_errors: usize,
}

impl UploadSummary {
    pub fn from_results(total_processed: usize, results: &[BatchUploadResult]) -> Self {
        results.iter().fold(
            Self {
                total_processed,
                ..Self::default()
            },
            |mut acc, result| {
                acc.total_added += result.added;
                acc.total_skipped += result.skipped;
                acc.total_errors += result.errors.len();
                acc
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub session: UploadSession,
    pub results: Vec<BatchUploadResult>,
    pub summary: UploadSummary,
    pub final_stats: FinalStats,
}
