use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;

use crate::{ClientError, EngineEvent, FailureKind};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);

    /// Emits a line for the user-facing run log.
    fn log(&self, line: String) {
        self.emit(EngineEvent::Log(line));
    }
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Limits for profile picture downloads.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(20),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait ThumbnailFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ClientError>;
}

/// Downloads profile pictures without credentials; the CDN serves them
/// publicly.
#[derive(Debug, Clone)]
pub struct ReqwestThumbnailFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestThumbnailFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn too_large(&self, actual: u64) -> ClientError {
        ClientError::new(
            FailureKind::Decode,
            format!(
                "image too large (max {}, actual {actual})",
                self.settings.max_bytes
            ),
        )
    }
}

#[async_trait::async_trait]
impl ThumbnailFetcher for ReqwestThumbnailFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| ClientError::new(FailureKind::InvalidInput, err.to_string()))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }
        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(self.too_large(content_len));
            }
        }
        if let Some(ct) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !ct.trim().to_ascii_lowercase().starts_with("image/") {
                return Err(ClientError::new(
                    FailureKind::Decode,
                    format!("unexpected content type {ct}"),
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(self.too_large(next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
