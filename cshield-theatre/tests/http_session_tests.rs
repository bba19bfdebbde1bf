//! Theatre flow against an in-process mock backend

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use cshield_common::events::{Availability, EventBus, ExpiryCause, SessionState};
use cshield_common::time::SystemClock;
use cshield_common::ClientConfig;
use cshield_theatre::{
    AuthError, HttpTheatreApi, MediaSurface, PlaybackController, SessionAuthenticator,
    StatusMonitor, TheatreApi,
};
use helpers::mock_backend::{MockBackend, TOKEN, VALID_KEY};
use helpers::surface::CountingSurface;

fn build(config: &ClientConfig) -> (Arc<CountingSurface>, SessionAuthenticator) {
    let api: Arc<dyn TheatreApi> = Arc::new(HttpTheatreApi::new(config).unwrap());
    let surface = Arc::new(CountingSurface::default());
    let controller = PlaybackController::new(
        Arc::clone(&api),
        Arc::clone(&surface) as Arc<dyn MediaSurface>,
        Arc::new(SystemClock),
        EventBus::default(),
        &config.playback,
    );
    (surface, SessionAuthenticator::new(api, controller))
}

#[tokio::test]
async fn test_valid_key_starts_playback() {
    let backend = MockBackend::start().await;
    let (surface, auth) = build(&backend.config());

    let info = auth.authenticate(VALID_KEY).await.unwrap();
    assert_eq!(info.state, SessionState::Playing);
    assert_eq!(info.shard_count, 4);
    assert_eq!(info.time_remaining, "180 min");

    let sources = surface.sources.lock().unwrap().clone();
    assert_eq!(sources.len(), 1);
    assert!(sources[0].ends_with(&format!("/api/stream/{}", TOKEN)));
    auth.controller().teardown().await;
}

#[tokio::test]
async fn test_invalid_key_is_rejected_inline() {
    let backend = MockBackend::start().await;
    let (surface, auth) = build(&backend.config());

    let err = auth.authenticate("KEY-WRONG").await.unwrap_err();
    assert_eq!(
        err,
        AuthError::Rejected {
            reason: "Invalid access key".to_string()
        }
    );
    assert!(auth.controller().session().await.is_none());
    assert!(surface.sources.lock().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(backend.expiry_checks(), 0);
}

#[tokio::test]
async fn test_unreachable_backend_is_connection_error() {
    let backend = MockBackend::start().await;
    let config = backend.config();
    drop(backend);
    // Give the aborted listener a moment to close
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (_, auth) = build(&config);
    let err = auth.authenticate(VALID_KEY).await.unwrap_err();
    assert!(matches!(err, AuthError::Connection(_)));
    assert!(err.to_string().starts_with("Connection error: "));
    assert!(!auth.is_in_flight());
}

#[tokio::test]
async fn test_server_expiry_ends_session() {
    let backend = MockBackend::start().await;
    let (surface, auth) = build(&backend.config());
    auth.authenticate(VALID_KEY).await.unwrap();

    backend.expire_token();
    let mut state = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(100)).await;
        state = auth.controller().state().await;
        if state == Some(SessionState::Expired) {
            break;
        }
    }
    assert_eq!(state, Some(SessionState::Expired));

    let expired = surface.expired.lock().unwrap().clone();
    assert_eq!(
        expired,
        vec![ExpiryCause::ServerReported {
            reason: Some("Playback window ended".to_string())
        }]
    );

    let checks = backend.expiry_checks();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(backend.expiry_checks(), checks);
}

#[tokio::test]
async fn test_status_monitor_reads_availability() {
    let backend = MockBackend::start().await;
    let config = backend.config();
    let api: Arc<dyn TheatreApi> = Arc::new(HttpTheatreApi::new(&config).unwrap());
    let monitor = StatusMonitor::new(api, EventBus::default(), &config.playback);

    let ready = monitor.poll_once().await.unwrap();
    assert!(matches!(
        ready,
        Availability::Ready { shards: 4, ref theatre_id, window_end: Some(_) } if theatre_id == "THEATRE_001"
    ));

    backend.set_ready(false);
    assert_eq!(monitor.poll_once().await, Some(Availability::NoMovie));
}
