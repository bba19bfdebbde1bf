//! Async driver for the progress monitor
//!
//! A [`PipelineWatcher`] owns at most one live subscription. Opening a new
//! job cancels the previous one first, and every message is checked
//! against the current subscription identity before it is applied, so a
//! superseded channel can never touch the new job's stepper.

use chrono::Utc;
use cshield_common::events::{ClientEvent, EventBus};
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::monitor::{Applied, MonitorSnapshot, ProgressMonitor};
use crate::api::ProducerApi;
use crate::presenter::ResultPresenter;

struct ActiveSubscription {
    id: Uuid,
    job_id: String,
    cancel: CancellationToken,
}

type ActiveSlot = Arc<Mutex<Option<ActiveSubscription>>>;

/// Handle to one opened job subscription
pub struct Subscription {
    id: Uuid,
    job_id: String,
    snapshots: watch::Receiver<MonitorSnapshot>,
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Receiver of render-ready snapshots; updated after every applied message
    pub fn snapshots(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until the subscription ends (terminal message, failure or
    /// cancellation) and return the last snapshot
    pub async fn finished(self) -> MonitorSnapshot {
        if let Err(e) = self.handle.await {
            warn!(job_id = %self.job_id, error = %e, "Progress task ended abnormally");
        }
        let last = self.snapshots.borrow().clone();
        last
    }
}

/// Owns the single active progress subscription
pub struct PipelineWatcher {
    api: Arc<dyn ProducerApi>,
    presenter: Arc<dyn ResultPresenter>,
    bus: EventBus,
    active: ActiveSlot,
}

impl PipelineWatcher {
    pub fn new(api: Arc<dyn ProducerApi>, presenter: Arc<dyn ResultPresenter>, bus: EventBus) -> Self {
        Self {
            api,
            presenter,
            bus,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Start consuming progress for `job_id`, tearing down any previous
    /// subscription first
    pub fn open(&self, job_id: impl Into<String>) -> Subscription {
        let job_id = job_id.into();
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();

        let previous = lock(&self.active).replace(ActiveSubscription {
            id,
            job_id: job_id.clone(),
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            info!(old_job = %previous.job_id, new_job = %job_id, "Closing previous progress subscription");
            previous.cancel.cancel();
        }

        let monitor = ProgressMonitor::new(job_id.clone());
        let (tx, rx) = watch::channel(monitor.snapshot());

        info!(job_id = %job_id, "Opening progress subscription");
        self.bus.emit_lossy(ClientEvent::PipelineStarted {
            job_id: job_id.clone(),
            timestamp: Utc::now(),
        });

        let task = SubscriptionTask {
            id,
            monitor,
            api: Arc::clone(&self.api),
            presenter: Arc::clone(&self.presenter),
            bus: self.bus.clone(),
            active: Arc::clone(&self.active),
            cancel,
            snapshots: tx,
        };
        let handle = tokio::spawn(task.run());

        Subscription {
            id,
            job_id,
            snapshots: rx,
            handle,
        }
    }

    /// Cancel the active subscription, if any
    pub fn close(&self) {
        if let Some(active) = lock(&self.active).take() {
            info!(job_id = %active.job_id, "Closing progress subscription");
            active.cancel.cancel();
        }
    }

    /// Job currently being watched
    pub fn active_job(&self) -> Option<String> {
        lock(&self.active).as_ref().map(|a| a.job_id.clone())
    }
}

impl Drop for PipelineWatcher {
    fn drop(&mut self) {
        self.close();
    }
}

fn lock(slot: &ActiveSlot) -> std::sync::MutexGuard<'_, Option<ActiveSubscription>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct SubscriptionTask {
    id: Uuid,
    monitor: ProgressMonitor,
    api: Arc<dyn ProducerApi>,
    presenter: Arc<dyn ResultPresenter>,
    bus: EventBus,
    active: ActiveSlot,
    cancel: CancellationToken,
    snapshots: watch::Sender<MonitorSnapshot>,
}

impl SubscriptionTask {
    fn is_current(&self) -> bool {
        lock(&self.active).as_ref().map(|a| a.id) == Some(self.id)
    }

    /// Clear the active slot if it still refers to this subscription
    fn release(&self) {
        let mut active = lock(&self.active);
        if active.as_ref().map(|a| a.id) == Some(self.id) {
            *active = None;
        }
    }

    async fn run(mut self) {
        let job_id = self.monitor.job_id().to_string();

        let opened = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(job_id = %job_id, "Subscription cancelled before the channel opened");
                return;
            }
            opened = self.api.open_progress(&job_id) => opened,
        };

        let mut stream = match opened {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Could not open progress channel");
                None
            }
        };

        loop {
            let next = match stream.as_mut() {
                Some(events) => tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        debug!(job_id = %job_id, "Subscription cancelled");
                        return;
                    }
                    item = events.next() => item,
                },
                None => None,
            };

            if !self.is_current() {
                debug!(job_id = %job_id, "Discarding message for superseded subscription");
                return;
            }

            let applied = match next {
                Some(Ok(event)) => {
                    debug!(job_id = %job_id, step = %event.step, progress = event.progress, "Progress message");
                    self.monitor.apply(&event)
                }
                Some(Err(e)) => {
                    warn!(job_id = %job_id, error = %e, "Progress channel error");
                    self.monitor.connection_lost()
                }
                None => self.monitor.connection_lost(),
            };

            if applied == Applied::Ignored {
                continue;
            }
            self.snapshots.send_replace(self.monitor.snapshot());

            match applied {
                Applied::Progressed => {
                    self.bus.emit_lossy(ClientEvent::PipelineProgress {
                        job_id: job_id.clone(),
                        progress: self.monitor.progress(),
                        message: self.monitor.message().to_string(),
                        active_stage: self.monitor.stepper().displayed(),
                        timestamp: Utc::now(),
                    });
                }
                Applied::Completed(result) => {
                    info!(job_id = %job_id, shards = result.shard_count, "Pipeline complete");
                    self.release();
                    self.bus.emit_lossy(ClientEvent::PipelineCompleted {
                        job_id: job_id.clone(),
                        key: result.key.clone(),
                        shards: result.shard_count,
                        timestamp: Utc::now(),
                    });
                    self.presenter.present(&job_id, &result);
                    return;
                }
                Applied::Failed(failure) => {
                    self.release();
                    self.bus.emit_lossy(ClientEvent::PipelineFailed {
                        job_id: job_id.clone(),
                        failure: failure.clone(),
                        timestamp: Utc::now(),
                    });
                    self.presenter.show_failure(&job_id, &failure);
                    return;
                }
                Applied::Ignored => {}
            }
        }
    }
}
