//! Movie transfer submission
//!
//! Validates the selected file, uploads it with byte-level progress and
//! returns the job identifier the pipeline monitor subscribes to.

use chrono::Utc;
use cshield_common::events::{ClientEvent, EventBus};
use cshield_common::ClientConfig;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::info;

use crate::api::{ProducerApi, UploadProgressFn};
use crate::{Error, Result};

/// Container formats the backend accepts
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["mp4", "mkv", "avi", "mov"];

/// Accepted upload, ready for progress monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub job_id: String,
    pub file_name: String,
    pub theatre_id: String,
}

/// Check the extension against [`ALLOWED_EXTENSIONS`], case-insensitively
pub fn validate_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(Error::UnsupportedFormat(ext))
    }
}

/// Percentage of `sent` over `total`, clamped to 100
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) as u128 * 100) / total as u128) as u8
}

/// Uploads movies on behalf of the producer
pub struct TransferSubmitter {
    api: Arc<dyn ProducerApi>,
    bus: EventBus,
    default_theatre_id: String,
}

impl TransferSubmitter {
    pub fn new(api: Arc<dyn ProducerApi>, bus: EventBus, config: &ClientConfig) -> Self {
        Self {
            api,
            bus,
            default_theatre_id: config.producer.default_theatre_id.clone(),
        }
    }

    /// Theatre id actually sent: trimmed input, or the configured default when blank
    pub fn resolve_theatre_id(&self, input: Option<&str>) -> String {
        match input.map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => self.default_theatre_id.clone(),
        }
    }

    /// Validate and upload `file`
    ///
    /// Fails before any network traffic if the file is missing or has an
    /// unsupported extension. Upload progress is published on the event bus
    /// whenever the whole-percent value changes.
    pub async fn submit(&self, file: impl Into<PathBuf>, theatre_id: Option<&str>) -> Result<TransferJob> {
        let file = file.into();
        validate_extension(&file)?;
        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(Error::FileNotFound(file)),
        }

        let theatre_id = self.resolve_theatre_id(theatre_id);
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(file = %file.display(), theatre_id = %theatre_id, "Uploading movie");

        let bus = self.bus.clone();
        // u8::MAX marks "nothing reported yet"
        let last_percent = Arc::new(AtomicU8::new(u8::MAX));
        let on_progress: UploadProgressFn = Arc::new(move |sent, total| {
            let percent = percent_of(sent, total);
            if last_percent.swap(percent, Ordering::Relaxed) != percent {
                bus.emit_lossy(ClientEvent::UploadProgress {
                    percent,
                    bytes_sent: sent,
                    total_bytes: total,
                    timestamp: Utc::now(),
                });
            }
        });

        let response = self.api.upload(&file, &theatre_id, on_progress).await?;
        info!(job_id = %response.movie_id, "Upload accepted");

        Ok(TransferJob {
            job_id: response.movie_id,
            file_name: response.filename.unwrap_or(file_name),
            theatre_id,
        })
    }
}
