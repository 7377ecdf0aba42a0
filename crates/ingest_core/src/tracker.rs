use std::time::Duration;

use crate::{
    format_duration, format_speed, BatchError, BatchUploadResult, Entry, SessionStatus,
    UploadProgress, UploadSession, UploadStage, MAX_SAMPLE_ADDRESSES,
};

const COMPLETING_PERCENT: u8 = 95;
const ETA_UNKNOWN: &str = "calculating";

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal upload stage transition {from:?} -> {to:?}")]
pub struct StageTransitionError {
    pub from: UploadStage,
    pub to: UploadStage,
}

/// Bookkeeping for one upload run.
///
/// Pure state: the orchestrator feeds it events and asks for snapshots, passing
/// the elapsed wall-clock time in so speed and ETA stay deterministic here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTracker {
    stage: UploadStage,
    total_addresses: usize,
    processed: usize,
    current_batch: usize,
    total_batches: usize,
    errors: Vec<BatchError>,
    session: Option<UploadSession>,
    message: Option<String>,
}

impl UploadTracker {
    pub fn new(total_addresses: usize, total_batches: usize) -> Self {
        Self {
            stage: UploadStage::CreatingSession,
            total_addresses,
            processed: 0,
            current_batch: 0,
            total_batches,
            errors: Vec::new(),
            session: None,
            message: None,
        }
    }

    pub fn stage(&self) -> UploadStage {
        self.stage
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    pub fn transition(&mut self, next: UploadStage) -> Result<(), StageTransitionError> {
        if !self.stage.can_transition_to(next) {
            return Err(StageTransitionError {
                from: self.stage,
                to: next,
            });
        }
        self.stage = next;
        if let Some(session) = self.session.as_mut() {
            match next {
                UploadStage::Completed => session.status = SessionStatus::Completed,
                UploadStage::Error => session.status = SessionStatus::Failed,
                UploadStage::Cancelled => session.status = SessionStatus::Cancelled,
                _ => {}
            }
        }
        Ok(())
    }

    /// Mirror the freshly created session and move to `Uploading`.
    pub fn session_created(&mut self, session: UploadSession) -> Result<(), StageTransitionError> {
        self.transition(UploadStage::Uploading)?;
        self.session = Some(session);
        Ok(())
    }

    pub fn begin_batch(&mut self, batch_index: usize) {
        self.current_batch = batch_index + 1;
    }

    /// Account for a resolved batch, successful or exhausted.
    pub fn record_batch(&mut self, batch: &[Entry], result: &BatchUploadResult) {
        self.processed += batch.len();
        if let Some(session) = self.session.as_mut() {
            session.processed_addresses = self.processed;
            session.completed_batches = (session.completed_batches + 1).min(session.total_batches);
        }

        let Some(first) = result.errors.first() else {
            return;
        };
        let message = if result.errors.len() == 1 {
            first.message.clone()
        } else {
            format!("{} errors, first: {}", result.errors.len(), first.message)
        };
        let from_errors: Vec<String> = result
            .errors
            .iter()
            .filter_map(|e| e.value.clone())
            .take(MAX_SAMPLE_ADDRESSES)
            .collect();
        let samples = if from_errors.is_empty() {
            batch
                .iter()
                .take(MAX_SAMPLE_ADDRESSES)
                .map(|e| e.as_str().to_string())
                .collect()
        } else {
            from_errors
        };
        self.errors.push(BatchError {
            batch_index: result.batch_index,
            message,
            sample_addresses: (!samples.is_empty()).then_some(samples),
        });
    }

    /// Enter the `Error` stage and keep the message for the next snapshot.
    pub fn fail(&mut self, message: impl Into<String>) {
        // Error is reachable from every non-terminal stage; a terminal run keeps its stage.
        let _ = self.transition(UploadStage::Error);
        self.message = Some(message.into());
    }

    pub fn snapshot(&self, elapsed: Duration) -> UploadProgress {
        let secs = elapsed.as_secs_f64();
        let rate = if secs > 0.0 && self.processed > 0 {
            self.processed as f64 / secs
        } else {
            0.0
        };
        let remaining = self.total_addresses.saturating_sub(self.processed);
        let eta_label = if remaining == 0 {
            format_duration(0)
        } else if rate > 0.0 {
            format_duration((remaining as f64 / rate).ceil() as u64)
        } else {
            ETA_UNKNOWN.to_string()
        };

        UploadProgress {
            stage: self.stage,
            total_addresses: self.total_addresses,
            processed_addresses: self.processed,
            current_batch: self.current_batch,
            total_batches: self.total_batches,
            progress_percent: self.percent(),
            speed_label: format_speed(rate.round() as u64),
            eta_label,
            errors: self.errors.clone(),
            session: self.session.clone(),
            message: self.message.clone(),
        }
    }

    fn percent(&self) -> u8 {
        match self.stage {
            UploadStage::CreatingSession => 0,
            UploadStage::Completing => COMPLETING_PERCENT,
            UploadStage::Completed => 100,
            UploadStage::Uploading | UploadStage::Error | UploadStage::Cancelled => {
                if self.total_addresses == 0 {
                    0
                } else {
                    let ratio = self.processed as f64 / self.total_addresses as f64;
                    (ratio * 100.0).round().min(100.0) as u8
                }
            }
        }
    }
}
