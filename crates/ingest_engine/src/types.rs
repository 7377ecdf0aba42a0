use std::fmt;

use ingest_core::{
    BatchUploadResult, ProcessingProgress, StageTransitionError, UploadProgress, UploadSession,
};

/// Progress payloads delivered to a [`ProgressSink`](crate::ProgressSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestEvent {
    Processing(ProcessingProgress),
    Upload(UploadProgress),
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClientError {
    pub kind: ClientFailureKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientFailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for ClientFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientFailureKind::InvalidUrl => write!(f, "invalid url"),
            ClientFailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            ClientFailureKind::Timeout => write!(f, "timeout"),
            ClientFailureKind::Network => write!(f, "network error"),
            ClientFailureKind::Decode => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Session creation failed; nothing was uploaded.
    #[error("failed to create upload session: {0}")]
    CreateSession(#[source] ClientError),
    /// Every batch was attempted but the session could not be closed.
    #[error("failed to complete upload session {session_id}: {source}")]
    CompleteSession {
        session_id: String,
        results: Vec<BatchUploadResult>,
        #[source]
        source: ClientError,
    },
    /// Batches already sent stay applied on the server.
    #[error("upload cancelled after {} of {total_batches} batches", .results.len())]
    Cancelled {
        session: UploadSession,
        results: Vec<BatchUploadResult>,
        total_batches: usize,
    },
    #[error(transparent)]
    Stage(#[from] StageTransitionError),
}

impl UploadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, UploadError::Cancelled { .. })
    }
}
