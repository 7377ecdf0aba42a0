//! Ingest engine: streaming input processing and the batched upload pipeline.
mod client;
mod decode;
mod file;
mod report;
mod sink;
mod types;
mod uploader;

pub use client::{ClientSettings, ReqwestSessionClient, SessionClient};
pub use decode::{detect_encoding, WindowDecoder};
pub use file::{FileProcessor, ProcessorSettings, DEFAULT_WINDOW_SIZE};
pub use report::{ensure_output_dir, write_rejects_report, AtomicFileWriter, ReportError};
pub use sink::{ChannelProgressSink, NullProgressSink, ProgressSink};
pub use types::{ClientError, ClientFailureKind, IngestEvent, ProcessError, UploadError};
pub use uploader::{BatchUploader, UploaderSettings, MAX_RETRIES};
