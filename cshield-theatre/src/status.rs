//! Backend availability polling
//!
//! Decides whether the authenticate affordance is offered. A failed poll
//! keeps whatever was known before.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use cshield_common::api::StatusResponse;
use cshield_common::config::PlaybackConfig;
use cshield_common::events::{Availability, ClientEvent, EventBus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::TheatreApi;

/// Interpret a status response
pub fn availability_from(status: &StatusResponse) -> Availability {
    if !status.ready {
        Availability::NoMovie
    } else if !status.playback_active {
        Availability::WindowInactive {
            start: status.playback_start,
            end: status.playback_end,
        }
    } else {
        Availability::Ready {
            shards: status.shards.unwrap_or(0),
            theatre_id: status.theatre_id.clone().unwrap_or_default(),
            window_end: status.playback_end,
        }
    }
}

pub struct StatusMonitor {
    api: Arc<dyn TheatreApi>,
    bus: EventBus,
    interval: Duration,
    tx: watch::Sender<Option<Availability>>,
}

impl StatusMonitor {
    pub fn new(api: Arc<dyn TheatreApi>, bus: EventBus, config: &PlaybackConfig) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            api,
            bus,
            interval: config.status_poll_interval(),
            tx,
        }
    }

    /// Latest known availability; `None` until the first successful poll
    pub fn subscribe(&self) -> watch::Receiver<Option<Availability>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Option<Availability> {
        self.tx.borrow().clone()
    }

    /// Poll once and return the (possibly unchanged) availability
    pub async fn poll_once(&self) -> Option<Availability> {
        match self.api.status().await {
            Ok(status) => {
                let next = availability_from(&status);
                let changed = self.tx.send_if_modified(|current| {
                    if current.as_ref() == Some(&next) {
                        false
                    } else {
                        *current = Some(next.clone());
                        true
                    }
                });
                if changed {
                    info!(availability = ?next, "Availability changed");
                    self.bus.emit_lossy(ClientEvent::AvailabilityChanged {
                        availability: next,
                        timestamp: Utc::now(),
                    });
                }
            }
            Err(e) => debug!(error = %e, "Status poll failed; keeping previous availability"),
        }
        self.current()
    }

    /// Poll immediately, then every interval until cancelled
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                self.poll_once().await;
            }
            debug!("Status monitor stopped");
        })
    }
}
