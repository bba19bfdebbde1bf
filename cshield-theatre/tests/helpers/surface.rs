//! Minimal surface that counts what the controller did

use std::sync::Mutex;

use cshield_common::events::{ExpiryCause, SessionState};
use cshield_theatre::{MediaSurface, SessionInfo};

#[derive(Debug, Default)]
pub struct CountingSurface {
    pub sources: Mutex<Vec<String>>,
    pub expired: Mutex<Vec<ExpiryCause>>,
    pub last_state: Mutex<Option<SessionState>>,
}

impl MediaSurface for CountingSurface {
    fn load_source(&self, url: &str) {
        self.sources.lock().unwrap().push(url.to_string());
    }

    fn play(&self) {}

    fn pause(&self) {}

    fn clear_source(&self) {}

    fn show_session_info(&self, _info: &SessionInfo) {}

    fn show_countdown(&self, _remaining_secs: i64, state: SessionState) {
        *self.last_state.lock().unwrap() = Some(state);
    }

    fn show_expired(&self, cause: &ExpiryCause) {
        self.expired.lock().unwrap().push(cause.clone());
    }

    fn set_enlarged(&self, _enlarged: bool) {}

    fn inject_exit_control(&self) {}

    fn remove_exit_control(&self) {}
}
