//! Terminal media surface for the theatre binary
//!
//! There is no real player in a terminal; the surface prints what a
//! graphical one would show.

use std::sync::atomic::{AtomicBool, Ordering};

use cshield_common::events::{Availability, ExpiryCause, SessionState};
use cshield_common::human_time::{format_clock, format_countdown};

use crate::session::{MediaSurface, SessionInfo};

#[derive(Debug, Default)]
pub struct ConsoleSurface {
    has_source: AtomicBool,
}

impl MediaSurface for ConsoleSurface {
    fn load_source(&self, _url: &str) {
        self.has_source.store(true, Ordering::Relaxed);
        println!("Stream ready");
    }

    fn play(&self) {
        println!("▶ Playing");
    }

    fn pause(&self) {
        println!("⏸ Paused");
    }

    fn clear_source(&self) {
        self.has_source.store(false, Ordering::Relaxed);
    }

    fn show_session_info(&self, info: &SessionInfo) {
        println!(
            "Theatre {} | {} shards | {} remaining",
            info.theatre_id, info.shard_count, info.time_remaining
        );
    }

    fn show_countdown(&self, remaining_secs: i64, state: SessionState) {
        let marker = match state {
            SessionState::Playing => " ",
            SessionState::Warning => "!",
            SessionState::Danger => "‼",
            SessionState::Expired => "✕",
        };
        println!("{} {}", marker, format_countdown(remaining_secs));
    }

    fn show_expired(&self, cause: &ExpiryCause) {
        match cause {
            ExpiryCause::LocalCountdown => println!("Playback window has ended"),
            ExpiryCause::ServerReported { reason: Some(reason) } => {
                println!("Playback window has ended: {}", reason)
            }
            ExpiryCause::ServerReported { reason: None } => {
                println!("Playback window has ended (confirmed by server)")
            }
        }
    }

    fn set_enlarged(&self, _enlarged: bool) {}

    fn inject_exit_control(&self) {}

    fn remove_exit_control(&self) {}
}

/// Banner text for an availability value
pub fn availability_banner(availability: &Availability) -> String {
    match availability {
        Availability::NoMovie => {
            "⚠ No movie available yet. Ask the producer to upload a movie first.".to_string()
        }
        Availability::WindowInactive { start, end } => format!(
            "⚠ Playback window is not active. Window: {} to {}",
            start.as_ref().map(format_clock).unwrap_or_else(|| "?".into()),
            end.as_ref().map(format_clock).unwrap_or_else(|| "?".into()),
        ),
        Availability::Ready {
            shards,
            theatre_id,
            window_end,
        } => format!(
            "✅ Movie ready: {} shards | Theatre: {} | Window ends {}",
            shards,
            theatre_id,
            window_end.as_ref().map(format_clock).unwrap_or_else(|| "?".into()),
        ),
    }
}
