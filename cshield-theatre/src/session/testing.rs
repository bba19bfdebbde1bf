//! Test doubles for the session controller

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use cshield_common::api::{AuthResponse, ExpiryCheckResponse, MovieInfo, StatusResponse};
use cshield_common::events::{ExpiryCause, SessionState};
use cshield_common::time::{Clock, SharedClock};
use tokio::sync::oneshot;

use super::surface::MediaSurface;
use super::SessionInfo;
use crate::api::TheatreApi;
use crate::{Error, Result};

/// Wall clock that follows tokio's (pausable) clock
pub struct TestClock {
    origin_utc: DateTime<Utc>,
    origin: tokio::time::Instant,
}

impl TestClock {
    pub fn shared() -> Arc<TestClock> {
        Arc::new(TestClock {
            origin_utc: Utc::now(),
            origin: tokio::time::Instant::now(),
        })
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        self.origin_utc + Duration::from_std(self.origin.elapsed()).unwrap()
    }
}

#[derive(Debug, Default)]
pub struct SurfaceLog {
    pub sources: Vec<String>,
    pub plays: usize,
    pub pauses: usize,
    pub clears: usize,
    pub infos: Vec<SessionInfo>,
    pub countdowns: Vec<(i64, SessionState)>,
    pub expired: Vec<ExpiryCause>,
    pub enlarged: bool,
    pub exit_controls: i32,
    pub max_exit_controls: i32,
}

/// Surface that records every call
#[derive(Default)]
pub struct RecordingSurface {
    log: Mutex<SurfaceLog>,
}

impl RecordingSurface {
    pub fn with<R>(&self, f: impl FnOnce(&SurfaceLog) -> R) -> R {
        f(&self.log.lock().unwrap())
    }

    pub fn exit_controls(&self) -> i32 {
        self.with(|l| l.exit_controls)
    }

    pub fn max_exit_controls(&self) -> i32 {
        self.with(|l| l.max_exit_controls)
    }

    pub fn is_enlarged(&self) -> bool {
        self.with(|l| l.enlarged)
    }

    pub fn expired_count(&self) -> usize {
        self.with(|l| l.expired.len())
    }

    pub fn last_state(&self) -> Option<SessionState> {
        self.with(|l| l.countdowns.last().map(|(_, s)| *s))
    }
}

impl MediaSurface for RecordingSurface {
    fn load_source(&self, url: &str) {
        self.log.lock().unwrap().sources.push(url.to_string());
    }

    fn play(&self) {
        self.log.lock().unwrap().plays += 1;
    }

    fn pause(&self) {
        self.log.lock().unwrap().pauses += 1;
    }

    fn clear_source(&self) {
        self.log.lock().unwrap().clears += 1;
    }

    fn show_session_info(&self, info: &SessionInfo) {
        self.log.lock().unwrap().infos.push(info.clone());
    }

    fn show_countdown(&self, remaining_secs: i64, state: SessionState) {
        self.log.lock().unwrap().countdowns.push((remaining_secs, state));
    }

    fn show_expired(&self, cause: &ExpiryCause) {
        self.log.lock().unwrap().expired.push(cause.clone());
    }

    fn set_enlarged(&self, enlarged: bool) {
        self.log.lock().unwrap().enlarged = enlarged;
    }

    fn inject_exit_control(&self) {
        let mut log = self.log.lock().unwrap();
        log.exit_controls += 1;
        log.max_exit_controls = log.max_exit_controls.max(log.exit_controls);
    }

    fn remove_exit_control(&self) {
        self.log.lock().unwrap().exit_controls -= 1;
    }
}

/// Scripted answer to one authenticate call
pub enum AuthScript {
    Grant { token: String, window_end: DateTime<Utc> },
    Reject(String),
}

/// How the expiry endpoint answers
pub enum ExpiryMode {
    Valid,
    Expired(Option<String>),
    Failing,
    /// Expired once the clock passes the given instant
    ExpiredAfter(DateTime<Utc>, SharedClock),
}

pub struct ScriptedTheatreApi {
    auth: Mutex<VecDeque<AuthScript>>,
    auth_gate: Mutex<Option<oneshot::Receiver<()>>>,
    expiry_gate: Mutex<Option<(String, oneshot::Receiver<()>)>>,
    expiry: Mutex<ExpiryMode>,
    pub auth_calls: AtomicUsize,
    pub expiry_calls: AtomicUsize,
}

impl Default for ScriptedTheatreApi {
    fn default() -> Self {
        Self {
            auth: Mutex::new(VecDeque::new()),
            auth_gate: Mutex::new(None),
            expiry_gate: Mutex::new(None),
            expiry: Mutex::new(ExpiryMode::Valid),
            auth_calls: AtomicUsize::new(0),
            expiry_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedTheatreApi {
    pub fn push_auth(&self, script: AuthScript) {
        self.auth.lock().unwrap().push_back(script);
    }

    /// Hold the next authenticate call until the returned sender fires
    pub fn gate_auth(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.auth_gate.lock().unwrap() = Some(rx);
        tx
    }

    /// Hold the next expiry check for `token` until the returned sender fires.
    /// The answer is computed from the mode in effect at release.
    pub fn gate_expiry(&self, token: &str) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.expiry_gate.lock().unwrap() = Some((token.to_string(), rx));
        tx
    }

    pub fn set_expiry(&self, mode: ExpiryMode) {
        *self.expiry.lock().unwrap() = mode;
    }

    pub fn expiry_calls(&self) -> usize {
        self.expiry_calls.load(Ordering::SeqCst)
    }
}

pub fn grant_response(token: &str, window_end: DateTime<Utc>) -> AuthResponse {
    AuthResponse {
        token: token.to_string(),
        movie_info: MovieInfo {
            shards: 4,
            theatre_id: "THEATRE_001".to_string(),
            time_remaining: "5 min".to_string(),
            window_end,
        },
    }
}

#[async_trait]
impl TheatreApi for ScriptedTheatreApi {
    async fn authenticate(&self, _key: &str) -> Result<AuthResponse> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.auth_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let script = self.auth.lock().unwrap().pop_front();
        match script {
            Some(AuthScript::Grant { token, window_end }) => Ok(grant_response(&token, window_end)),
            Some(AuthScript::Reject(message)) => {
                Err(cshield_common::Error::Server { status: 401, message }.into())
            }
            None => Err(cshield_common::Error::Server {
                status: 401,
                message: String::new(),
            }
            .into()),
        }
    }

    async fn check_expiry(&self, token: &str) -> Result<ExpiryCheckResponse> {
        self.expiry_calls.fetch_add(1, Ordering::SeqCst);
        let gate = {
            let mut slot = self.expiry_gate.lock().unwrap();
            match slot.as_ref() {
                Some((gated, _)) if gated == token => slot.take().map(|(_, rx)| rx),
                _ => None,
            }
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        let expiry = self.expiry.lock().unwrap();
        let expired = match &*expiry {
            ExpiryMode::Valid => false,
            ExpiryMode::Expired(_) => true,
            ExpiryMode::Failing => {
                return Err(Error::Common(cshield_common::Error::Protocol(
                    "upstream unavailable".to_string(),
                )))
            }
            ExpiryMode::ExpiredAfter(at, clock) => clock.now() >= *at,
        };
        let reason = match &*expiry {
            ExpiryMode::Expired(reason) => reason.clone(),
            _ if expired => Some("Playback window ended".to_string()),
            _ => None,
        };
        Ok(ExpiryCheckResponse {
            expired,
            reason,
            remaining_seconds: None,
        })
    }

    async fn status(&self) -> Result<StatusResponse> {
        Ok(StatusResponse {
            ready: false,
            playback_active: false,
            playback_start: None,
            playback_end: None,
            shards: None,
            theatre_id: None,
        })
    }

    fn stream_url(&self, token: &str) -> Result<String> {
        Ok(format!("http://test/api/stream/{}", token))
    }
}
