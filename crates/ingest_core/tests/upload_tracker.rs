use std::time::Duration;

use chrono::Utc;
use ingest_core::{
    BatchUploadResult, Entry, EntryError, SessionStatus, UploadSession, UploadStage,
    UploadSummary, UploadTracker, MAX_SAMPLE_ADDRESSES,
};
use pretty_assertions::assert_eq;

fn session(total: usize, batches: usize) -> UploadSession {
    UploadSession {
        session_id: "s-1".to_string(),
        survey_id: "survey-9".to_string(),
        total_addresses: total,
        processed_addresses: 0,
        total_batches: batches,
        completed_batches: 0,
        replace_mode: false,
        created_at: Utc::now(),
        status: SessionStatus::Active,
    }
}

fn batch(prefix: &str, n: usize) -> Vec<Entry> {
    (0..n)
        .map(|i| Entry::normalize(&format!("{prefix}{i}")).unwrap())
        .collect()
}

fn ok(index: usize, added: usize, skipped: usize) -> BatchUploadResult {
    BatchUploadResult {
        batch_index: index,
        added,
        skipped,
        errors: Vec::new(),
    }
}

#[test]
fn happy_path_walks_every_stage() {
    let mut tracker = UploadTracker::new(150, 2);
    assert_eq!(tracker.snapshot(Duration::ZERO).progress_percent, 0);

    tracker.session_created(session(150, 2)).unwrap();
    let first = batch("a", 100);
    tracker.begin_batch(0);
    tracker.record_batch(&first, &ok(0, 100, 0));

    let mid = tracker.snapshot(Duration::from_secs(2));
    assert_eq!(mid.stage, UploadStage::Uploading);
    assert_eq!(mid.current_batch, 1);
    assert_eq!(mid.processed_addresses, 100);
    assert_eq!(mid.progress_percent, 67);
    assert_eq!(mid.speed_label, "50 addresses/sec");
    assert_eq!(mid.eta_label, "1 sec");
    assert_eq!(mid.session.as_ref().unwrap().completed_batches, 1);

    let second = batch("b", 50);
    tracker.begin_batch(1);
    tracker.record_batch(&second, &ok(1, 40, 10));

    tracker.transition(UploadStage::Completing).unwrap();
    assert_eq!(tracker.snapshot(Duration::from_secs(3)).progress_percent, 95);
    tracker.transition(UploadStage::Completed).unwrap();

    let done = tracker.snapshot(Duration::from_secs(3));
    assert_eq!(done.progress_percent, 100);
    let mirrored = done.session.unwrap();
    assert_eq!(mirrored.status, SessionStatus::Completed);
    assert_eq!(mirrored.completed_batches, 2);
    assert_eq!(mirrored.processed_addresses, 150);
}

#[test]
fn illegal_transitions_are_rejected() {
    let mut tracker = UploadTracker::new(10, 1);
    assert!(tracker.transition(UploadStage::Cancelled).is_err());
    assert!(tracker.transition(UploadStage::Completed).is_err());

    tracker.session_created(session(10, 1)).unwrap();
    tracker.transition(UploadStage::Cancelled).unwrap();
    assert!(tracker.transition(UploadStage::Error).is_err());
    assert_eq!(tracker.stage(), UploadStage::Cancelled);
    assert_eq!(tracker.session().unwrap().status, SessionStatus::Cancelled);
}

#[test]
fn failure_snapshot_carries_message() {
    let mut tracker = UploadTracker::new(10, 1);
    tracker.fail("create failed: boom");

    let snap = tracker.snapshot(Duration::from_millis(10));
    assert_eq!(snap.stage, UploadStage::Error);
    assert_eq!(snap.message.as_deref(), Some("create failed: boom"));
    assert_eq!(snap.eta_label, "calculating");
}

#[test]
fn failed_batches_record_capped_samples() {
    let mut tracker = UploadTracker::new(20, 1);
    tracker.session_created(session(20, 1)).unwrap();
    let entries = batch("c", 20);
    let failed = BatchUploadResult::failed(0, "connection reset", Utc::now());
    tracker.record_batch(&entries, &failed);

    let snap = tracker.snapshot(Duration::from_secs(1));
    assert_eq!(snap.errors.len(), 1);
    let error = &snap.errors[0];
    assert_eq!(error.batch_index, 0);
    assert_eq!(error.message, "connection reset");
    let samples = error.sample_addresses.as_ref().unwrap();
    assert_eq!(samples.len(), MAX_SAMPLE_ADDRESSES);
    assert_eq!(samples[0], "c0");
}

#[test]
fn server_reported_values_are_preferred_as_samples() {
    let mut tracker = UploadTracker::new(3, 1);
    tracker.session_created(session(3, 1)).unwrap();
    let entries = batch("d", 3);
    let result = BatchUploadResult {
        batch_index: 0,
        added: 1,
        skipped: 0,
        errors: vec![
            EntryError {
                value: Some("d1".to_string()),
                message: "rejected".to_string(),
                timestamp: Utc::now(),
            },
            EntryError {
                value: Some("d2".to_string()),
                message: "rejected".to_string(),
                timestamp: Utc::now(),
            },
        ],
    };
    tracker.record_batch(&entries, &result);

    let error = &tracker.snapshot(Duration::from_secs(1)).errors[0];
    assert_eq!(error.message, "2 errors, first: rejected");
    assert_eq!(
        error.sample_addresses.as_deref(),
        Some(&["d1".to_string(), "d2".to_string()][..])
    );
}

#[test]
fn summary_keeps_server_skips_separate_from_errors() {
    let results = vec![
        ok(0, 90, 10),
        BatchUploadResult::failed(1, "gave up", Utc::now()),
        ok(2, 50, 0),
    ];
    let summary = UploadSummary::from_results(250, &results);

    assert_eq!(
        summary,
        UploadSummary {
            total_processed: 250,
            total_added: 140,
            total_skipped: 10,
            total_errors: 1,
        }
    );
}
