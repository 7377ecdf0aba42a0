use std::time::Duration;

use ingest_core::{BatchUploadResult, CompleteSessionResponse, Entry, EntryError, UploadSession};
use ingest_logging::ingest_debug;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientFailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Endpoints live under `{base_url}/{target_id}/`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub auth_token: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/surveys".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            auth_token: None,
        }
    }
}

/// The three calls the remote store exposes for a batched import.
///
/// Implementations translate shapes only; retry and ordering belong to the
/// caller.
#[async_trait::async_trait]
pub trait SessionClient: Send + Sync {
    async fn create_session(
        &self,
        target_id: &str,
        total_count: usize,
        replace_mode: bool,
        batch_size: usize,
    ) -> Result<UploadSession, ClientError>;

    async fn upload_batch(
        &self,
        target_id: &str,
        session_id: &str,
        batch_index: usize,
        entries: &[Entry],
    ) -> Result<BatchUploadResult, ClientError>;

    async fn complete_session(
        &self,
        target_id: &str,
        session_id: &str,
    ) -> Result<CompleteSessionResponse, ClientError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    total_addresses: usize,
    replace_mode: bool,
    batch_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadBatchRequest<'a> {
    session_id: &'a str,
    batch_index: usize,
    addresses: &'a [Entry],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompleteSessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Deserialize)]
struct UploadBatchResponse {
    #[serde(default)]
    added: usize,
    #[serde(default)]
    skipped: usize,
    #[serde(default)]
    errors: Vec<EntryError>,
}

/// JSON-over-HTTP client for the session endpoints.
#[derive(Debug, Clone)]
pub struct ReqwestSessionClient {
    base: Url,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl ReqwestSessionClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|err| ClientError::new(ClientFailureKind::InvalidUrl, err.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::new(
                ClientFailureKind::InvalidUrl,
                format!("{} cannot be used as a base url", settings.base_url),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(ClientFailureKind::Network, err.to_string()))?;

        Ok(Self {
            base,
            auth_token: settings.auth_token,
            client,
        })
    }

    fn endpoint(&self, target_id: &str, action: &str) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::new(ClientFailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .push(target_id)
            .push(action);
        Ok(url)
    }

    async fn post<B, T>(&self, url: Url, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        ingest_debug!("POST {}", url);
        let mut request = self.client.post(url).json(body);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::new(
                ClientFailureKind::HttpStatus(status.as_u16()),
                server_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes)
            .map_err(|err| ClientError::new(ClientFailureKind::Decode, err.to_string()))
    }
}

#[async_trait::async_trait]
impl SessionClient for ReqwestSessionClient {
    async fn create_session(
        &self,
        target_id: &str,
        total_count: usize,
        replace_mode: bool,
        batch_size: usize,
    ) -> Result<UploadSession, ClientError> {
        let url = self.endpoint(target_id, "create-session")?;
        let body = CreateSessionRequest {
            total_addresses: total_count,
            replace_mode,
            batch_size,
        };
        self.post(url, &body).await
    }

    async fn upload_batch(
        &self,
        target_id: &str,
        session_id: &str,
        batch_index: usize,
        entries: &[Entry],
    ) -> Result<BatchUploadResult, ClientError> {
        let url = self.endpoint(target_id, "upload-batch")?;
        let body = UploadBatchRequest {
            session_id,
            batch_index,
            addresses: entries,
        };
        let response: UploadBatchResponse = self.post(url, &body).await?;
        Ok(BatchUploadResult {
            batch_index,
            added: response.added,
            skipped: response.skipped,
            errors: response.errors,
        })
    }

    async fn complete_session(
        &self,
        target_id: &str,
        session_id: &str,
    ) -> Result<CompleteSessionResponse, ClientError> {
        let url = self.endpoint(target_id, "complete-session")?;
        self.post(url, &CompleteSessionRequest { session_id }).await
    }
}

/// Pull `error` or `message` out of a JSON error body.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(ClientFailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClientError::new(ClientFailureKind::Decode, err.to_string());
    }
    ClientError::new(ClientFailureKind::Network, err.to_string())
}
