//! Playback session lifecycle
//!
//! One [`PlaybackController`] owns at most one session. Each session runs
//! two periodic tasks sharing a cancellation token:
//!
//! - the local countdown (default 1 s) recomputes the state from
//!   `window_end - now`
//! - server reconciliation (default 60 s) asks the backend whether the
//!   token has expired
//!
//! Both act only after re-checking, under the controller lock, that their
//! session is still the current one and not yet expired. Expiry is a
//! one-way transition whose side effects run exactly once.

use std::sync::{Arc, Weak};

use chrono::Utc;
use cshield_common::config::PlaybackConfig;
use cshield_common::events::{ClientEvent, EventBus, ExpiryCause, PauseReason, SessionState};
use cshield_common::time::SharedClock;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::cinema::CinemaMode;
use super::deterrence::{self, InputEvent, InputVerdict};
use super::state::{state_for_remaining, Thresholds};
use super::surface::MediaSurface;
use super::{LifecycleEpoch, SessionGrant, SessionInfo};
use crate::api::{token_prefix, TheatreApi};
use crate::error::AuthError;

struct ActiveSession {
    info: SessionInfo,
    token: String,
    cancel: CancellationToken,
    timers: Vec<JoinHandle<()>>,
}

#[derive(Default)]
struct Inner {
    epoch: u64,
    session: Option<ActiveSession>,
    cinema: CinemaMode,
}

impl Inner {
    /// Current session if it is `id`
    fn current_mut(&mut self, id: Uuid) -> Option<&mut ActiveSession> {
        self.session.as_mut().filter(|s| s.info.id == id)
    }

    fn has_live_session(&self) -> bool {
        self.session
            .as_ref()
            .map_or(false, |s| !s.info.state.is_terminal())
    }
}

struct Shared {
    api: Arc<dyn TheatreApi>,
    surface: Arc<dyn MediaSurface>,
    clock: SharedClock,
    bus: EventBus,
    config: PlaybackConfig,
    thresholds: Thresholds,
    inner: Mutex<Inner>,
}

/// Owner of the active playback session
#[derive(Clone)]
pub struct PlaybackController {
    shared: Arc<Shared>,
}

/// Whole seconds left, rounded up so the readout hits 00:00 only at expiry
fn remaining_secs(remaining: chrono::Duration) -> i64 {
    (remaining.num_milliseconds() + 999).div_euclid(1000).max(0)
}

impl PlaybackController {
    pub fn new(
        api: Arc<dyn TheatreApi>,
        surface: Arc<dyn MediaSurface>,
        clock: SharedClock,
        bus: EventBus,
        config: &PlaybackConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                surface,
                clock,
                bus,
                config: config.clone(),
                thresholds: Thresholds::from(config),
                inner: Mutex::new(Inner::default()),
            }),
        }
    }

    /// Ticket for a request that may later start a session
    pub async fn epoch(&self) -> LifecycleEpoch {
        LifecycleEpoch(self.shared.inner.lock().await.epoch)
    }

    /// Replace any current session with one built from `grant`
    ///
    /// Fails with [`AuthError::Stale`] if the lifecycle moved on since
    /// `ticket` was taken.
    pub async fn start_session(
        &self,
        grant: SessionGrant,
        ticket: LifecycleEpoch,
    ) -> Result<SessionInfo, AuthError> {
        let shared = &self.shared;
        let url = shared
            .api
            .stream_url(&grant.token)
            .map_err(|e| AuthError::Rejected {
                reason: e.to_string(),
            })?;

        let mut inner = shared.inner.lock().await;
        if inner.epoch != ticket.0 {
            info!(
                ticket = ticket.0,
                epoch = inner.epoch,
                "Discarding authentication response for an outdated lifecycle"
            );
            return Err(AuthError::Stale);
        }

        shared.end_current(&mut inner);
        inner.epoch += 1;

        let remaining = grant.window_end - shared.clock.now();
        let state = state_for_remaining(remaining, &shared.thresholds);
        let info = SessionInfo {
            id: Uuid::new_v4(),
            theatre_id: grant.theatre_id,
            shard_count: grant.shard_count,
            window_end: grant.window_end,
            time_remaining: grant.time_remaining,
            state,
        };

        info!(
            session_id = %info.id,
            theatre_id = %info.theatre_id,
            token = token_prefix(&grant.token),
            %state,
            "Playback session started"
        );
        shared.surface.show_session_info(&info);
        shared.bus.emit_lossy(ClientEvent::SessionStarted {
            session_id: info.id,
            theatre_id: info.theatre_id.clone(),
            shard_count: info.shard_count,
            window_end: info.window_end,
            state,
            timestamp: Utc::now(),
        });

        let cancel = CancellationToken::new();
        let mut active = ActiveSession {
            info: info.clone(),
            token: grant.token,
            cancel: cancel.clone(),
            timers: Vec::new(),
        };

        if state.is_terminal() {
            // Window already over: a session exists only to show it expired
            active.info.state = SessionState::Playing;
            inner.session = Some(active);
            shared.expire_locked(&mut inner, ExpiryCause::LocalCountdown);
            return Ok(SessionInfo {
                state: SessionState::Expired,
                ..info
            });
        }

        shared.surface.load_source(&url);
        shared.surface.play();
        shared.surface.show_countdown(remaining_secs(remaining), state);

        active.timers = vec![
            self.spawn_countdown(info.id, cancel.clone()),
            self.spawn_reconciliation(info.id, cancel),
        ];
        inner.session = Some(active);
        Ok(info)
    }

    fn spawn_countdown(&self, id: Uuid, cancel: CancellationToken) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        let period = self.shared.config.countdown_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !tick(&weak, |shared| shared.countdown_tick(id)).await {
                    break;
                }
            }
            debug!(session_id = %id, "Countdown stopped");
        })
    }

    fn spawn_reconciliation(&self, id: Uuid, cancel: CancellationToken) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.shared);
        let period = self.shared.config.expiry_check_interval();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                let keep_going = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    more = tick(&weak, |shared| shared.reconcile(id)) => more,
                };
                if !keep_going {
                    break;
                }
            }
            debug!(session_id = %id, "Expiry reconciliation stopped");
        })
    }

    /// Snapshot of the current session, expired or not
    pub async fn session(&self) -> Option<SessionInfo> {
        self.shared
            .inner
            .lock()
            .await
            .session
            .as_ref()
            .map(|s| s.info.clone())
    }

    pub async fn state(&self) -> Option<SessionState> {
        self.session().await.map(|s| s.state)
    }

    /// End the current session without expiring it
    pub async fn teardown(&self) {
        let mut inner = self.shared.inner.lock().await;
        if inner.session.is_some() {
            self.shared.end_current(&mut inner);
            inner.epoch += 1;
        }
    }

    /// Apply viewer input; returns whether the default behaviour should run
    pub async fn handle_input(&self, event: InputEvent) -> InputVerdict {
        let shared = &self.shared;
        match &event {
            InputEvent::VisibilityChanged { hidden: true } => {
                let inner = shared.inner.lock().await;
                if let Some(active) = inner.session.as_ref().filter(|s| !s.info.state.is_terminal()) {
                    info!(session_id = %active.info.id, "Page hidden, pausing playback");
                    shared.surface.pause();
                    shared.bus.emit_lossy(ClientEvent::PlaybackPaused {
                        session_id: active.info.id,
                        reason: PauseReason::Hidden,
                        timestamp: Utc::now(),
                    });
                }
                InputVerdict::Allow
            }
            InputEvent::Key(combo) if combo.is_escape() => {
                let mut inner = shared.inner.lock().await;
                if inner.cinema.handles_escape() && inner.cinema.exit(&*shared.surface) {
                    shared.cinema_changed(false);
                }
                InputVerdict::Allow
            }
            _ => {
                let verdict = deterrence::classify(&event);
                if verdict == InputVerdict::Suppress {
                    let label = match &event {
                        InputEvent::Key(combo) => combo.to_string(),
                        _ => "context-menu".to_string(),
                    };
                    debug!(input = %label, "Suppressed capture shortcut");
                    shared.bus.emit_lossy(ClientEvent::CaptureSuppressed {
                        input: label,
                        timestamp: Utc::now(),
                    });
                }
                verdict
            }
        }
    }

    /// Manual resume after a pause; refused once the session is gone or expired
    pub async fn resume(&self) -> bool {
        let inner = self.shared.inner.lock().await;
        match inner.session.as_ref().filter(|s| !s.info.state.is_terminal()) {
            Some(active) => {
                info!(session_id = %active.info.id, "Resuming playback");
                self.shared.surface.play();
                true
            }
            None => {
                debug!("Resume ignored, no live session");
                false
            }
        }
    }

    /// Enter presentation mode; only while a session is playing
    pub async fn enter_cinema_mode(&self) -> bool {
        let mut inner = self.shared.inner.lock().await;
        if !inner.has_live_session() {
            return false;
        }
        let changed = inner.cinema.enter(&*self.shared.surface);
        if changed {
            self.shared.cinema_changed(true);
        }
        changed
    }

    pub async fn exit_cinema_mode(&self) -> bool {
        let mut inner = self.shared.inner.lock().await;
        let changed = inner.cinema.exit(&*self.shared.surface);
        if changed {
            self.shared.cinema_changed(false);
        }
        changed
    }

    /// Flip presentation mode; returns whether it is now active
    pub async fn toggle_cinema_mode(&self) -> bool {
        let active = self.shared.inner.lock().await.cinema.is_active();
        if active {
            self.exit_cinema_mode().await;
            false
        } else {
            self.enter_cinema_mode().await
        }
    }

    pub async fn cinema_active(&self) -> bool {
        self.shared.inner.lock().await.cinema.is_active()
    }
}

/// Run one timer step if the controller still exists
async fn tick<F, Fut>(weak: &Weak<Shared>, step: F) -> bool
where
    F: FnOnce(Arc<Shared>) -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    match weak.upgrade() {
        Some(shared) => step(shared).await,
        None => false,
    }
}

impl Shared {
    /// Local countdown step; false once the session is gone or expired
    async fn countdown_tick(self: Arc<Self>, id: Uuid) -> bool {
        let mut inner = self.inner.lock().await;
        let now = self.clock.now();
        let Some(active) = inner.current_mut(id) else {
            debug!(session_id = %id, "Countdown tick for superseded session");
            return false;
        };
        if active.info.state.is_terminal() {
            return false;
        }

        let remaining = active.info.window_end - now;
        let old_state = active.info.state;
        let new_state = state_for_remaining(remaining, &self.thresholds);

        if new_state.is_terminal() {
            self.expire_locked(&mut inner, ExpiryCause::LocalCountdown);
            return false;
        }

        let secs = remaining_secs(remaining);
        if new_state != old_state {
            active.info.state = new_state;
            info!(session_id = %id, %old_state, %new_state, remaining_secs = secs, "Session state changed");
            self.bus.emit_lossy(ClientEvent::SessionStateChanged {
                session_id: id,
                old_state,
                new_state,
                remaining_secs: secs,
                timestamp: Utc::now(),
            });
        }
        self.surface.show_countdown(secs, new_state);
        true
    }

    /// Server reconciliation step; false once the session is gone or expired
    async fn reconcile(self: Arc<Self>, id: Uuid) -> bool {
        let token = {
            let mut inner = self.inner.lock().await;
            match inner.current_mut(id) {
                Some(active) if !active.info.state.is_terminal() => active.token.clone(),
                _ => return false,
            }
        };

        let result = self.api.check_expiry(&token).await;

        let mut inner = self.inner.lock().await;
        let live = inner
            .current_mut(id)
            .map_or(false, |active| !active.info.state.is_terminal());
        if !live {
            debug!(session_id = %id, "Discarding expiry check for a finished session");
            return false;
        }

        match result {
            Ok(check) if check.expired => {
                info!(session_id = %id, reason = ?check.reason, "Backend reports session expired");
                self.expire_locked(
                    &mut inner,
                    ExpiryCause::ServerReported {
                        reason: check.reason,
                    },
                );
                false
            }
            Ok(check) => {
                debug!(session_id = %id, remaining = ?check.remaining_seconds, "Session still valid");
                true
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "Expiry check failed; local countdown still applies");
                true
            }
        }
    }

    /// One-way transition into Expired for the current session
    fn expire_locked(&self, inner: &mut Inner, cause: ExpiryCause) {
        let Inner {
            epoch,
            session,
            cinema,
        } = inner;
        let Some(active) = session.as_mut() else {
            return;
        };
        if active.info.state.is_terminal() {
            return;
        }

        let id = active.info.id;
        let old_state = active.info.state;
        active.info.state = SessionState::Expired;
        active.cancel.cancel();
        active.timers.clear();
        *epoch += 1;

        self.surface.pause();
        self.surface.clear_source();
        self.surface.show_countdown(0, SessionState::Expired);
        self.surface.show_expired(&cause);
        if cinema.exit(&*self.surface) {
            self.cinema_changed(false);
        }

        info!(session_id = %id, ?cause, "Playback session expired");
        let now = Utc::now();
        self.bus.emit_lossy(ClientEvent::SessionStateChanged {
            session_id: id,
            old_state,
            new_state: SessionState::Expired,
            remaining_secs: 0,
            timestamp: now,
        });
        self.bus.emit_lossy(ClientEvent::PlaybackPaused {
            session_id: id,
            reason: PauseReason::Expired,
            timestamp: now,
        });
        self.bus.emit_lossy(ClientEvent::SessionExpired {
            session_id: id,
            cause,
            timestamp: now,
        });
    }

    /// Stop and forget the current session, if any
    fn end_current(&self, inner: &mut Inner) {
        if let Some(active) = inner.session.take() {
            active.cancel.cancel();
            for timer in active.timers {
                timer.abort();
            }
            if !active.info.state.is_terminal() {
                self.surface.pause();
                self.surface.clear_source();
            }
            info!(session_id = %active.info.id, "Playback session torn down");
        }
        if inner.cinema.exit(&*self.surface) {
            self.cinema_changed(false);
        }
    }

    fn cinema_changed(&self, active: bool) {
        debug!(active, "Cinema mode changed");
        self.bus.emit_lossy(ClientEvent::CinemaModeChanged {
            active,
            timestamp: Utc::now(),
        });
    }
}
