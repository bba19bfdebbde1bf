//! Backend access for the producer client
//!
//! [`ProducerApi`] is the seam between the workflow logic and HTTP; tests
//! substitute scripted implementations. [`HttpProducerApi`] talks to the
//! real backend with reqwest.

use async_trait::async_trait;
use cshield_common::api::{endpoints, AuditEntry, ErrorResponse, HistoryEntry, ProgressEvent, UploadResponse};
use cshield_common::ClientConfig;
use futures::stream::{BoxStream, StreamExt};
use reqwest::multipart::{Form, Part};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::sse;
use crate::{Error, Result};

const USER_AGENT: &str = concat!("cshield-producer/", env!("CARGO_PKG_VERSION"));

/// Byte-level upload progress callback: `(bytes_sent, total_bytes)`
pub type UploadProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Decoded progress messages of one job; ends when the channel closes
pub type ProgressEventStream = BoxStream<'static, Result<ProgressEvent>>;

/// Producer-side backend operations
#[async_trait]
pub trait ProducerApi: Send + Sync {
    /// Upload a movie file; returns the job identifier on success
    async fn upload(
        &self,
        file: &Path,
        theatre_id: &str,
        on_progress: UploadProgressFn,
    ) -> Result<UploadResponse>;

    /// Open the long-lived progress channel for a job
    async fn open_progress(&self, job_id: &str) -> Result<ProgressEventStream>;

    /// Processing history, newest first
    async fn history(&self) -> Result<Vec<HistoryEntry>>;

    /// Audit trail, newest first
    async fn audit_log(&self) -> Result<Vec<AuditEntry>>;
}

/// reqwest-backed [`ProducerApi`]
#[derive(Clone)]
pub struct HttpProducerApi {
    config: ClientConfig,
    /// Request/response calls, bounded by the configured timeout
    client: reqwest::Client,
    /// Uploads and the progress stream, which may legitimately run long
    long_client: reqwest::Client,
}

impl HttpProducerApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout())
            .build()?;
        let long_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            config: config.clone(),
            client,
            long_client,
        })
    }

    /// Extract the backend's `{error}` message from a failed response
    async fn error_message(response: reqwest::Response, fallback: &str) -> String {
        let status = response.status();
        match response.json::<ErrorResponse>().await {
            Ok(body) if !body.error.is_empty() => body.error,
            _ => {
                debug!(status = status.as_u16(), "Error response without JSON body");
                fallback.to_string()
            }
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint_url(path)?;
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Request failed").await;
            return Err(cshield_common::Error::Server {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ProducerApi for HttpProducerApi {
    async fn upload(
        &self,
        file: &Path,
        theatre_id: &str,
        on_progress: UploadProgressFn,
    ) -> Result<UploadResponse> {
        let handle = tokio::fs::File::open(file).await?;
        let total = handle.metadata().await?.len();
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let mut sent = 0u64;
        let counted = ReaderStream::new(handle).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                on_progress(sent, total);
            }
            chunk
        });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(counted), total)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new()
            .part("file", part)
            .text("theatre_id", theatre_id.to_string());

        let url = self.config.endpoint_url(endpoints::UPLOAD)?;
        let response = self
            .long_client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Upload transport failure");
                Error::Transfer("Upload error. Check your connection.".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Upload failed").await;
            return Err(Error::Transfer(message));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| Error::Transfer(format!("Unreadable upload response: {}", e)))
    }

    async fn open_progress(&self, job_id: &str) -> Result<ProgressEventStream> {
        let url = self.config.endpoint_url(&endpoints::process(job_id))?;
        let response = self
            .long_client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response, "Progress stream unavailable").await;
            return Err(Error::Stream(format!("{} ({})", message, status.as_u16())));
        }

        let events = sse::decode_stream(response.bytes_stream()).filter_map(|message| async move {
            match message {
                Ok(message) => match serde_json::from_str::<ProgressEvent>(&message.data) {
                    Ok(event) => Some(Ok(event)),
                    Err(e) => {
                        warn!(error = %e, bytes = message.data.len(), "Skipping malformed progress message");
                        None
                    }
                },
                Err(e) => Some(Err(Error::Http(e))),
            }
        });

        Ok(events.boxed())
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.get_json(endpoints::HISTORY).await
    }

    async fn audit_log(&self) -> Result<Vec<AuditEntry>> {
        self.get_json(endpoints::AUDIT_LOG).await
    }
}
