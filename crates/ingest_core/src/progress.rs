use serde::{Deserialize, Serialize};

use crate::UploadSession;

/// Cap on the addresses quoted alongside a failed batch.
pub const MAX_SAMPLE_ADDRESSES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    Reading,
    Parsing,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingProgress {
    pub stage: ProcessingStage,
    pub progress_percent: u8,
    pub current_line: usize,
    /// Extrapolated from the share of bytes read so far.
    pub total_lines: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    CreatingSession,
    Uploading,
    Completing,
    Completed,
    Error,
    Cancelled,
}

impl UploadStage {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            UploadStage::Completed | UploadStage::Error | UploadStage::Cancelled
        )
    }

    pub fn can_transition_to(self, next: UploadStage) -> bool {
        use UploadStage::*;
        match (self, next) {
            (CreatingSession, Uploading) | (Uploading, Completing) | (Completing, Completed) => {
                true
            }
            (Uploading, Cancelled) => true,
            (from, Error) => !from.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    pub batch_index: usize,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_addresses: Option<Vec<String>>,
}

/// Point-in-time view of an upload run, emitted after every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub stage: UploadStage,
    pub total_addresses: usize,
    pub processed_addresses: usize,
    /// 1-based index of the batch most recently started; 0 before the first.
    pub current_batch: usize,
    pub total_batches: usize,
    pub progress_percent: u8,
    pub speed_label: String,
    pub eta_label: String,
    pub errors: Vec<BatchError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<UploadSession>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
