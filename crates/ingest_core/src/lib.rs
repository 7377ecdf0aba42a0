//! Ingest core: pure address-list processing, batching and upload bookkeeping.
mod config;
mod entry;
mod labels;
mod partition;
mod process;
mod progress;
mod session;
mod tracker;
mod validate;

pub use config::{
    BatchSettings, BATCH_SIZE_STEP, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE, MIN_BATCH_SIZE,
    SECONDS_PER_BATCH,
};
pub use entry::{Entry, InvalidEntry, ProcessingResult, ProcessingStats, INVALID_REASON};
pub use labels::{estimated_upload_time, format_duration, format_speed};
pub use partition::{batch_count, partition};
pub use process::{process_text, LineClassifier};
pub use progress::{
    BatchError, ProcessingProgress, ProcessingStage, UploadProgress, UploadStage,
    MAX_SAMPLE_ADDRESSES,
};
pub use session::{
    BatchUploadResult, CompleteSessionResponse, EntryError, FinalStats, SessionStatus,
    UploadOutcome, UploadSession, UploadSummary,
};
pub use tracker::{StageTransitionError, UploadTracker};
pub use validate::{AcceptNonEmpty, HexAddressValidator, LineValidator};
