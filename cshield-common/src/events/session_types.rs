//! Playback session type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Playback session state, derived from the time left in the window
///
/// Ordered by urgency: `Playing < Warning < Danger < Expired`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// More than the warning threshold left
    Playing,
    /// Within the warning threshold
    Warning,
    /// Within the danger threshold
    Danger,
    /// Window over; terminal
    Expired,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Expired)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Playing => write!(f, "playing"),
            SessionState::Warning => write!(f, "warning"),
            SessionState::Danger => write!(f, "danger"),
            SessionState::Expired => write!(f, "expired"),
        }
    }
}

/// Which check noticed the end of the playback window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ExpiryCause {
    /// Local countdown reached zero
    LocalCountdown,
    /// Backend reported the token as expired
    ServerReported { reason: Option<String> },
}

/// Why playback was paused by the controller rather than the viewer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    /// Page or window was hidden
    Hidden,
    /// Session expired
    Expired,
}

/// Whether the theatre can currently authenticate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Availability {
    /// No processed movie on the backend
    NoMovie,
    /// A movie exists but now is outside its playback window
    WindowInactive {
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    },
    /// A movie is ready and inside its window
    Ready {
        shards: u32,
        theatre_id: String,
        window_end: Option<DateTime<Utc>>,
    },
}

impl Availability {
    /// Authentication is only offered while a movie is playable
    pub fn accepts_authentication(&self) -> bool {
        matches!(self, Availability::Ready { .. })
    }
}
