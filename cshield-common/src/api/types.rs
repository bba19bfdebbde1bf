//! Request/response bodies of the CinemaShield backend
//!
//! Field names follow the backend's snake_case JSON. Timestamps are parsed
//! leniently (see [`crate::time::parse_iso`]) because the backend emits
//! both `Z` and `+00:00` suffixes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::time::serde_iso;

// ========================================
// Producer Types
// ========================================

/// Successful upload response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadResponse {
    /// Job identifier used to open the progress stream
    pub movie_id: String,
    /// Sanitised filename as stored by the backend
    #[serde(default)]
    pub filename: Option<String>,
}

/// Error body returned by every endpoint on failure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One message of the processing progress stream
///
/// `progress` is clamped to `0..=100` while deserialising, so a consumer
/// never sees an out-of-range value. `key` and `shards` are only present on
/// the terminal `done` message.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProgressEvent {
    /// Stage token (`cleanup`, `sharding_done`, `done`, `error`, ...)
    pub step: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_progress")]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shards: Option<u32>,
}

impl ProgressEvent {
    /// Convenience constructor for a non-terminal message
    pub fn new(step: impl Into<String>, message: impl Into<String>, progress: u8) -> Self {
        Self {
            step: step.into(),
            message: message.into(),
            progress: progress.min(100),
            key: None,
            shards: None,
        }
    }
}

/// Clamp any JSON number (or null) into a whole percentage
fn deserialize_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(clamp_percent(raw.unwrap_or(0.0)))
}

/// Clamp a raw percentage into `0..=100`; non-finite values become 0
pub fn clamp_percent(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.clamp(0.0, 100.0).round() as u8
}

/// One processed movie in the producer history list
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct HistoryEntry {
    #[serde(default)]
    pub movie_id: Option<String>,
    pub name: String,
    pub shards: u32,
    pub theatre_id: String,
    pub key: String,
    #[serde(default)]
    pub processed_at: Option<String>,
}

/// One audit trail entry
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AuditEntry {
    pub timestamp: String,
    pub action: String,
    #[serde(default)]
    pub details: Option<Map<String, Value>>,
}

// ========================================
// Theatre Types
// ========================================

/// Playback availability as reported by the backend
///
/// Only `ready` is guaranteed; the remaining fields are present once a
/// movie has been processed.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StatusResponse {
    pub ready: bool,
    #[serde(default)]
    pub playback_active: bool,
    #[serde(default, with = "serde_iso::option")]
    pub playback_start: Option<DateTime<Utc>>,
    #[serde(default, with = "serde_iso::option")]
    pub playback_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shards: Option<u32>,
    #[serde(default)]
    pub theatre_id: Option<String>,
}

/// Access key exchange request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthRequest {
    pub key: String,
}

/// Successful access key exchange
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthResponse {
    /// Playback token; scopes the stream and expiry-check endpoints
    pub token: String,
    pub movie_info: MovieInfo,
}

/// Session metadata returned with a playback token
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MovieInfo {
    pub shards: u32,
    pub theatre_id: String,
    /// Display string such as `"178 min"`
    #[serde(default)]
    pub time_remaining: String,
    #[serde(with = "serde_iso")]
    pub window_end: DateTime<Utc>,
}

/// Server-side expiry check for a playback token
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ExpiryCheckResponse {
    pub expired: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
}
