use std::collections::HashSet;

use crate::{
    estimated_upload_time, BatchSettings, Entry, InvalidEntry, LineValidator, ProcessingResult,
    ProcessingStats, INVALID_REASON,
};

/// Incremental line classifier shared by the text and streaming file paths.
///
/// Feed lines in input order with [`push_line`](Self::push_line); the
/// classifier tracks the line number, the seen-set and the three output lists.
pub struct LineClassifier<'v> {
    validator: &'v dyn LineValidator,
    seen: HashSet<Entry>,
    valid: Vec<Entry>,
    duplicates: Vec<Entry>,
    invalid: Vec<InvalidEntry>,
    lines: usize,
}

impl<'v> LineClassifier<'v> {
    pub fn new(validator: &'v dyn LineValidator) -> Self {
        Self {
            validator,
            seen: HashSet::new(),
            valid: Vec::new(),
            duplicates: Vec::new(),
            invalid: Vec::new(),
            lines: 0,
        }
    }

    /// Classify one raw line (without its terminator).
    pub fn push_line(&mut self, raw: &str) {
        self.lines += 1;
        let Some(entry) = Entry::normalize(raw) else {
            return;
        };

        if !self.validator.is_valid(entry.as_str()) {
            self.invalid.push(InvalidEntry {
                original_value: raw.trim().to_string(),
                line_number: self.lines,
                reason: INVALID_REASON.to_string(),
            });
        } else if self.seen.contains(&entry) {
            self.duplicates.push(entry);
        } else {
            self.seen.insert(entry.clone());
            self.valid.push(entry);
        }
    }

    /// Lines consumed so far, blank lines included.
    pub fn lines_seen(&self) -> usize {
        self.lines
    }

    pub fn finish(self, batch_size_hint: usize, settings: &BatchSettings) -> ProcessingResult {
        let batch_size = settings.clamp(batch_size_hint);
        let stats = ProcessingStats {
            total_lines: self.lines,
            valid_count: self.valid.len(),
            duplicate_count: self.duplicates.len(),
            invalid_count: self.invalid.len(),
            estimated_upload_time: estimated_upload_time(self.valid.len(), batch_size),
        };
        ProcessingResult {
            valid_entries: self.valid,
            duplicates: self.duplicates,
            invalid_entries: self.invalid,
            stats,
        }
    }
}

/// Process pasted text held fully in memory.
///
/// Lines are split the way [`str::lines`] splits them, so a trailing newline
/// does not produce an extra line.
pub fn process_text(
    text: &str,
    validator: &dyn LineValidator,
    settings: &BatchSettings,
) -> ProcessingResult {
    let mut classifier = LineClassifier::new(validator);
    for line in text.lines() {
        classifier.push_line(line);
    }
    classifier.finish(settings.default, settings)
}
