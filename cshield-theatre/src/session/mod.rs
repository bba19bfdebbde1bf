//! Playback Session Controller
//!
//! - [`controller`]: session lifecycle, dual-clock expiry, input handling
//! - [`state`]: pure remaining-time → state mapping
//! - [`surface`]: media surface seam
//! - [`cinema`]: presentation mode
//! - [`deterrence`]: capture-shortcut classification

pub mod cinema;
pub mod controller;
pub mod deterrence;
pub mod state;
pub mod surface;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{DateTime, Utc};
use cshield_common::api::AuthResponse;
use cshield_common::events::SessionState;
use serde::Serialize;
use uuid::Uuid;

pub use cinema::CinemaMode;
pub use controller::PlaybackController;
pub use deterrence::{InputEvent, InputVerdict, Key, KeyCombo};
pub use state::{state_for_remaining, Thresholds};
pub use surface::MediaSurface;

/// Everything a successful key exchange yields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub token: String,
    pub theatre_id: String,
    pub shard_count: u32,
    pub window_end: DateTime<Utc>,
    /// Backend display string, e.g. `"178 min"`
    pub time_remaining: String,
}

impl From<AuthResponse> for SessionGrant {
    fn from(response: AuthResponse) -> Self {
        let info = response.movie_info;
        Self {
            token: response.token,
            theatre_id: info.theatre_id,
            shard_count: info.shards,
            window_end: info.window_end,
            time_remaining: info.time_remaining,
        }
    }
}

/// Public view of a playback session; the token is deliberately absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub theatre_id: String,
    pub shard_count: u32,
    pub window_end: DateTime<Utc>,
    pub time_remaining: String,
    pub state: SessionState,
}

/// Controller lifecycle counter captured when a request starts
///
/// Bumped whenever a session starts, expires or is torn down. A response
/// carrying an older epoch is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LifecycleEpoch(pub(crate) u64);
