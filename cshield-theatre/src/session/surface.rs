//! Media surface seam
//!
//! Everything the controller does to the player goes through
//! [`MediaSurface`], so the lifecycle can run without a presentation layer.

use cshield_common::events::{ExpiryCause, SessionState};

use super::SessionInfo;

/// The player and the affordances around it
pub trait MediaSurface: Send + Sync {
    /// Point the player at a media URL
    fn load_source(&self, url: &str);

    fn play(&self);

    fn pause(&self);

    /// Drop the media URL so nothing more can be fetched
    fn clear_source(&self);

    /// Shard count, theatre and time remaining for a new session
    fn show_session_info(&self, info: &SessionInfo);

    /// Countdown readout with its urgency styling
    fn show_countdown(&self, remaining_secs: i64, state: SessionState);

    /// Expiry overlay
    fn show_expired(&self, cause: &ExpiryCause);

    /// Enlarged presentation layout on or off
    fn set_enlarged(&self, enlarged: bool);

    /// Add the exit-presentation control
    fn inject_exit_control(&self);

    fn remove_exit_control(&self);
}
