use std::path::Path;
use std::sync::Arc;

use ingest_core::{
    AcceptNonEmpty, BatchSettings, LineClassifier, LineValidator, ProcessingProgress,
    ProcessingResult, ProcessingStage, DEFAULT_BATCH_SIZE,
};
use ingest_logging::{ingest_debug, ingest_info, ingest_warn, PhaseTimer};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::decode::WindowDecoder;
use crate::{IngestEvent, ProcessError, ProgressSink};

/// Bytes read per window when streaming a file.
pub const DEFAULT_WINDOW_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ProcessorSettings {
    pub window_size: usize,
    pub batch: BatchSettings,
    /// Batch size used for the upload time estimate.
    pub batch_size_hint: usize,
}

impl Default for ProcessorSettings {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            batch: BatchSettings::default(),
            batch_size_hint: DEFAULT_BATCH_SIZE,
        }
    }
}

/// Turns raw text or files into a validated, deduplicated entry set.
pub struct FileProcessor {
    settings: ProcessorSettings,
    validator: Arc<dyn LineValidator>,
}

impl FileProcessor {
    pub fn new(settings: ProcessorSettings, validator: Arc<dyn LineValidator>) -> Self {
        Self {
            settings,
            validator,
        }
    }

    pub fn with_default_validator(settings: ProcessorSettings) -> Self {
        Self::new(settings, Arc::new(AcceptNonEmpty))
    }

    /// Process text that is already in memory, e.g. pasted input.
    pub fn process_text(&self, text: &str) -> ProcessingResult {
        let mut classifier = LineClassifier::new(self.validator.as_ref());
        for line in text.lines() {
            classifier.push_line(line);
        }
        self.finish(classifier)
    }

    pub async fn process_file(
        &self,
        path: &Path,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessingResult, ProcessError> {
        let file = tokio::fs::File::open(path).await?;
        let total_bytes = file.metadata().await?.len();
        ingest_info!("Processing {:?} ({} bytes)", path, total_bytes);
        self.process_reader(file, Some(total_bytes), sink).await
    }

    /// Stream `reader` window by window.
    ///
    /// Only complete lines are classified as they arrive; the partial line at
    /// the end of a window is carried into the next one. Whatever remains after
    /// the last window is classified as the final line.
    pub async fn process_reader<R>(
        &self,
        mut reader: R,
        total_bytes: Option<u64>,
        sink: &dyn ProgressSink,
    ) -> Result<ProcessingResult, ProcessError>
    where
        R: AsyncRead + Unpin,
    {
        let _timer = PhaseTimer::start("process_reader");
        let mut classifier = LineClassifier::new(self.validator.as_ref());
        let mut decoder = WindowDecoder::new();
        let mut window = vec![0u8; self.settings.window_size.max(1)];
        let mut carry = String::new();
        let mut bytes_read: u64 = 0;

        sink.emit(IngestEvent::Processing(ProcessingProgress {
            stage: ProcessingStage::Reading,
            progress_percent: 0,
            current_line: 0,
            total_lines: None,
            message: "Reading input".to_string(),
        }));

        loop {
            let filled = fill_window(&mut reader, &mut window).await?;
            if filled == 0 {
                carry.push_str(&decoder.decode(&[], true));
                break;
            }
            bytes_read += filled as u64;
            carry.push_str(&decoder.decode(&window[..filled], false));

            if let Some(newline) = carry.rfind('\n') {
                let partial = carry.split_off(newline + 1);
                for line in carry.lines() {
                    classifier.push_line(line);
                }
                carry = partial;
            }

            sink.emit(IngestEvent::Processing(parsing_progress(
                classifier.lines_seen(),
                bytes_read,
                total_bytes,
            )));
        }

        if !carry.is_empty() {
            classifier.push_line(&carry);
        }

        if decoder.had_errors() {
            ingest_warn!(
                "Input contained byte sequences invalid for {}; they were replaced",
                decoder.encoding_name().unwrap_or("the detected encoding")
            );
        }
        ingest_debug!(
            "Read {} bytes as {}",
            bytes_read,
            decoder.encoding_name().unwrap_or("(empty input)")
        );

        let result = self.finish(classifier);
        sink.emit(IngestEvent::Processing(ProcessingProgress {
            stage: ProcessingStage::Complete,
            progress_percent: 100,
            current_line: result.stats.total_lines,
            total_lines: Some(result.stats.total_lines),
            message: format!(
                "Processed {} lines: {} valid, {} duplicates, {} invalid",
                result.stats.total_lines,
                result.stats.valid_count,
                result.stats.duplicate_count,
                result.stats.invalid_count
            ),
        }));
        Ok(result)
    }

    fn finish(&self, classifier: LineClassifier<'_>) -> ProcessingResult {
        let result = classifier.finish(self.settings.batch_size_hint, &self.settings.batch);
        ingest_info!(
            "Processed {} lines: {} valid, {} duplicates, {} invalid",
            result.stats.total_lines,
            result.stats.valid_count,
            result.stats.duplicate_count,
            result.stats.invalid_count
        );
        result
    }
}

fn parsing_progress(lines: usize, bytes_read: u64, total_bytes: Option<u64>) -> ProcessingProgress {
    let (percent, estimated_total) = match total_bytes {
        Some(total) if total > 0 && bytes_read > 0 => {
            let percent = (bytes_read.saturating_mul(100) / total).min(99) as u8;
            let estimate = (lines as f64 * total as f64 / bytes_read as f64).round() as usize;
            (percent, Some(estimate.max(lines)))
        }
        _ => (0, None),
    };
    ProcessingProgress {
        stage: ProcessingStage::Parsing,
        progress_percent: percent,
        current_line: lines,
        total_lines: estimated_total,
        message: format!("Processed {lines} lines"),
    }
}

/// Read until `window` is full or the reader is exhausted.
async fn fill_window<R>(reader: &mut R, window: &mut [u8]) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < window.len() {
        let n = reader.read(&mut window[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
