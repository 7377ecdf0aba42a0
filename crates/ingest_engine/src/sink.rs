use std::sync::mpsc;

use crate::IngestEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: IngestEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(IngestEvent) + Send + Sync,
{
    fn emit(&self, event: IngestEvent) {
        self(event)
    }
}

/// Discards every event; for callers that do not render progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: IngestEvent) {}
}

/// Forwards events to another thread, e.g. a UI loop.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<IngestEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<IngestEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: IngestEvent) {
        // A dropped receiver only means nobody is watching any more.
        let _ = self.tx.send(event);
    }
}
