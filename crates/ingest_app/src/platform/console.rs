use ingest_core::{ProcessingProgress, ProcessingStage, UploadProgress, UploadStage};
use ingest_engine::{IngestEvent, ProgressSink};
use ingest_logging::ingest_debug;

/// Renders progress events as one status line each on stderr.
pub(crate) struct ConsoleProgress {
    quiet: bool,
}

impl ConsoleProgress {
    pub(crate) fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: IngestEvent) {
        let line = match &event {
            IngestEvent::Processing(progress) => render_processing(progress),
            IngestEvent::Upload(progress) => render_upload(progress),
        };
        ingest_debug!("{}", line);
        if !self.quiet {
            eprintln!("{line}");
        }
    }
}

pub(crate) fn render_processing(progress: &ProcessingProgress) -> String {
    let stage = match progress.stage {
        ProcessingStage::Reading => "reading",
        ProcessingStage::Parsing => "parsing",
        ProcessingStage::Complete => "complete",
    };
    match progress.total_lines {
        Some(total) if progress.stage == ProcessingStage::Parsing => format!(
            "[{stage}] {:>3}% line {} of ~{}",
            progress.progress_percent, progress.current_line, total
        ),
        _ => format!(
            "[{stage}] {:>3}% {}",
            progress.progress_percent, progress.message
        ),
    }
}

pub(crate) fn render_upload(progress: &UploadProgress) -> String {
    let stage = match progress.stage {
        UploadStage::CreatingSession => "creating session",
        UploadStage::Uploading => "uploading",
        UploadStage::Completing => "completing",
        UploadStage::Completed => "completed",
        UploadStage::Error => "error",
        UploadStage::Cancelled => "cancelled",
    };
    let mut line = format!(
        "[{stage}] {:>3}% batch {}/{} | {}/{} addresses | {} | eta {}",
        progress.progress_percent,
        progress.current_batch,
        progress.total_batches,
        progress.processed_addresses,
        progress.total_addresses,
        progress.speed_label,
        progress.eta_label
    );
    if !progress.errors.is_empty() {
        line.push_str(&format!(" | {} failed batches", progress.errors.len()));
    }
    if let Some(message) = &progress.message {
        line.push_str(&format!(" | {message}"));
    }
    line
}
