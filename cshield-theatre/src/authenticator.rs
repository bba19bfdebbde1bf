//! Session Authenticator
//!
//! Exchanges a typed access key for a playback token and hands the grant
//! to the [`PlaybackController`]. One exchange at a time; no retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::api::TheatreApi;
use crate::error::AuthError;
use crate::session::{PlaybackController, SessionGrant, SessionInfo};

/// Clears the in-flight flag however the exchange ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct SessionAuthenticator {
    api: Arc<dyn TheatreApi>,
    controller: PlaybackController,
    in_flight: AtomicBool,
}

impl SessionAuthenticator {
    pub fn new(api: Arc<dyn TheatreApi>, controller: PlaybackController) -> Self {
        Self {
            api,
            controller,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether submission is currently disabled
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Exchange `input` for a new playback session
    ///
    /// Blank input is rejected without a request. The error's `Display` is
    /// the inline message; submission is re-enabled once this returns.
    pub async fn authenticate(&self, input: &str) -> Result<SessionInfo, AuthError> {
        let key = input.trim();
        if key.is_empty() {
            return Err(AuthError::EmptyKey);
        }
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return Err(AuthError::InFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let ticket = self.controller.epoch().await;
        info!("Authenticating access key");

        let response = self.api.authenticate(key).await.map_err(|e| {
            let err = AuthError::from_api(e);
            warn!(reason = %err, "Authentication failed");
            err
        })?;

        self.controller
            .start_session(SessionGrant::from(response), ticket)
            .await
    }

    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }
}
