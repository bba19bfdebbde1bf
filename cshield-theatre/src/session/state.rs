//! Session state derivation
//!
//! The state is never set directly; it is always recomputed from the time
//! left in the playback window.

use chrono::Duration;
use cshield_common::config::PlaybackConfig;
use cshield_common::events::SessionState;

/// Remaining-time boundaries between states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: Duration,
    pub danger: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: Duration::seconds(300),
            danger: Duration::seconds(60),
        }
    }
}

impl From<&PlaybackConfig> for Thresholds {
    fn from(config: &PlaybackConfig) -> Self {
        Self {
            warning: Duration::seconds(config.warning_threshold_secs),
            danger: Duration::seconds(config.danger_threshold_secs),
        }
    }
}

/// Map time left in the window to a state
///
/// | remaining              | state   |
/// |------------------------|---------|
/// | `> warning`            | Playing |
/// | `danger < r ≤ warning` | Warning |
/// | `0 < r ≤ danger`       | Danger  |
/// | `≤ 0`                  | Expired |
pub fn state_for_remaining(remaining: Duration, thresholds: &Thresholds) -> SessionState {
    if remaining <= Duration::zero() {
        SessionState::Expired
    } else if remaining <= thresholds.danger {
        SessionState::Danger
    } else if remaining <= thresholds.warning {
        SessionState::Warning
    } else {
        SessionState::Playing
    }
}
