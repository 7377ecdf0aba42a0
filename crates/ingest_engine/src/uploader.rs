use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use ingest_core::{
    batch_count, partition, BatchSettings, BatchUploadResult, Entry, UploadOutcome, UploadStage,
    UploadSummary, UploadTracker,
};
use ingest_logging::{ingest_error, ingest_info, ingest_warn, PhaseTimer};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::{IngestEvent, ProgressSink, SessionClient, UploadError};

/// Attempts per batch before it is recorded as failed.
pub const MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct UploaderSettings {
    pub batch: BatchSettings,
    pub max_retries: u32,
    /// Retry `n` (from 1) waits `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for UploaderSettings {
    fn default() -> Self {
        Self {
            batch: BatchSettings::default(),
            max_retries: MAX_RETRIES,
            backoff_base: Duration::from_secs(1),
        }
    }
}

/// Drives one upload session at a time: create, sequential batches with
/// retry, complete.
pub struct BatchUploader {
    client: Arc<dyn SessionClient>,
    settings: UploaderSettings,
    cancel: Mutex<CancellationToken>,
}

impl BatchUploader {
    pub fn new(client: Arc<dyn SessionClient>, settings: UploaderSettings) -> Self {
        Self {
            client,
            settings,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Request cancellation of the running upload.
    ///
    /// Takes effect before the next batch starts; a batch request already in
    /// flight is allowed to finish.
    pub fn cancel(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    fn reset_cancellation(&self) -> CancellationToken {
        let mut current = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        *current = CancellationToken::new();
        current.clone()
    }

    pub async fn upload_addresses(
        &self,
        target_id: &str,
        entries: &[Entry],
        replace_mode: bool,
        sink: &dyn ProgressSink,
        batch_size: Option<usize>,
    ) -> Result<UploadOutcome, UploadError> {
        let _timer = PhaseTimer::start("upload_addresses");
        let batch_size = self.settings.batch.resolve(batch_size);
        let cancel = self.reset_cancellation();
        let started = Instant::now();
        let total_batches = batch_count(entries.len(), batch_size);
        let mut tracker = UploadTracker::new(entries.len(), total_batches);
        let emit = |tracker: &UploadTracker| {
            sink.emit(IngestEvent::Upload(tracker.snapshot(started.elapsed())));
        };

        emit(&tracker);
        let created = match self
            .client
            .create_session(target_id, entries.len(), replace_mode, batch_size)
            .await
        {
            Ok(session) => session,
            Err(err) => {
                ingest_error!("Creating upload session for {} failed: {}", target_id, err);
                tracker.fail(err.to_string());
                emit(&tracker);
                return Err(UploadError::CreateSession(err));
            }
        };
        ingest_info!(
            "Session {} for {}: {} addresses in {} batches of {} (replace={})",
            created.session_id,
            target_id,
            entries.len(),
            total_batches,
            batch_size,
            replace_mode
        );
        let session_id = created.session_id.clone();
        tracker.session_created(created.clone())?;
        emit(&tracker);

        let batches = partition(entries, batch_size, &self.settings.batch);
        let mut results = Vec::with_capacity(batches.len());
        for (index, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                ingest_warn!(
                    "Session {} cancelled before batch {} of {}",
                    session_id,
                    index + 1,
                    total_batches
                );
                tracker.transition(UploadStage::Cancelled)?;
                emit(&tracker);
                return Err(UploadError::Cancelled {
                    session: tracker.session().cloned().unwrap_or(created),
                    results,
                    total_batches,
                });
            }

            tracker.begin_batch(index);
            let result = self
                .upload_with_retry(target_id, &session_id, index, batch)
                .await;
            tracker.record_batch(batch, &result);
            results.push(result);
            emit(&tracker);
        }

        tracker.transition(UploadStage::Completing)?;
        emit(&tracker);
        let completion = match self.client.complete_session(target_id, &session_id).await {
            Ok(completion) => completion,
            Err(err) => {
                ingest_error!("Completing session {} failed: {}", session_id, err);
                tracker.fail(err.to_string());
                emit(&tracker);
                return Err(UploadError::CompleteSession {
                    session_id,
                    results,
                    source: err,
                });
            }
        };

        let summary = UploadSummary::from_results(tracker.processed(), &results);
        tracker.transition(UploadStage::Completed)?;
        emit(&tracker);
        ingest_info!(
            "Session {} completed: {} added, {} skipped, {} errors",
            session_id,
            summary.total_added,
            summary.total_skipped,
            summary.total_errors
        );

        Ok(UploadOutcome {
            session: tracker.session().cloned().unwrap_or(created),
            results,
            summary,
            final_stats: completion.final_stats,
        })
    }

    /// Upload one batch, retrying with exponential backoff. Never fails: an
    /// exhausted batch comes back as a result carrying the last error.
    async fn upload_with_retry(
        &self,
        target_id: &str,
        session_id: &str,
        batch_index: usize,
        batch: &[Entry],
    ) -> BatchUploadResult {
        let max_attempts = self.settings.max_retries.max(1);
        let mut attempt = 1;
        loop {
            match self
                .client
                .upload_batch(target_id, session_id, batch_index, batch)
                .await
            {
                Ok(mut result) => {
                    result.batch_index = batch_index;
                    return result;
                }
                Err(err) if attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    ingest_warn!(
                        "Batch {} attempt {}/{} failed: {}; retrying in {:?}",
                        batch_index,
                        attempt,
                        max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    ingest_error!(
                        "Batch {} failed after {} attempts: {}",
                        batch_index,
                        attempt,
                        err
                    );
                    return BatchUploadResult::failed(batch_index, err.to_string(), Utc::now());
                }
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.settings
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
