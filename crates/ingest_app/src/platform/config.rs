use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ingest_core::{AcceptNonEmpty, BatchSettings, HexAddressValidator, LineValidator};
use ingest_engine::{ClientSettings, ProcessorSettings, UploaderSettings, DEFAULT_WINDOW_SIZE};
use ingest_logging::ingest_info;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub(crate) const DEFAULT_CONFIG_FILE: &str = "ingest.ron";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum ValidatorKind {
    /// Any non-blank line.
    Any,
    /// Prefixed fixed-length hex, e.g. `0x` + 40 digits.
    Hex { prefix: String, digits: usize },
}

impl ValidatorKind {
    pub(crate) fn build(&self) -> Arc<dyn LineValidator> {
        match self {
            ValidatorKind::Any => Arc::new(AcceptNonEmpty),
            ValidatorKind::Hex { prefix, digits } => Arc::new(HexAddressValidator {
                prefix: prefix.to_lowercase(),
                hex_digits: *digits,
            }),
        }
    }

    pub(crate) fn strict() -> Self {
        let defaults = HexAddressValidator::default();
        ValidatorKind::Hex {
            prefix: defaults.prefix,
            digits: defaults.hex_digits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub batch: BatchSettings,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub window_size: usize,
    pub validator: ValidatorKind,
    pub log: LogDestination,
}

impl Default for AppConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        let uploader = UploaderSettings::default();
        Self {
            base_url: client.base_url,
            auth_token: None,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
            batch: uploader.batch,
            max_retries: uploader.max_retries,
            backoff_base_ms: uploader.backoff_base.as_millis() as u64,
            window_size: DEFAULT_WINDOW_SIZE,
            validator: ValidatorKind::Any,
            log: LogDestination::default(),
        }
    }
}

impl AppConfig {
    pub(crate) fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            auth_token: self.auth_token.clone(),
        }
    }

    pub(crate) fn uploader_settings(&self) -> UploaderSettings {
        UploaderSettings {
            batch: self.batch,
            max_retries: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }

    pub(crate) fn processor_settings(&self, batch_size_hint: Option<usize>) -> ProcessorSettings {
        ProcessorSettings {
            window_size: self.window_size,
            batch: self.batch,
            batch_size_hint: self.batch.resolve(batch_size_hint),
        }
    }
}

/// Load the RON config at `path`.
///
/// A missing file yields defaults unless the path was given explicitly; a file
/// that exists but does not parse is always an error.
pub(crate) fn load_config(path: &Path, explicit: bool) -> anyhow::Result<AppConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !explicit => {
            return Ok(AppConfig::default());
        }
        Err(err) => {
            Err(err).with_context(|| format!("failed to read config {}", path.display()))?
        }
    };

    let config: AppConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    ingest_info!("Loaded config from {:?}", path);
    Ok(config)
}
