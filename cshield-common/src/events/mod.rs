//! Event types for the CinemaShield client event system
//!
//! Provides the shared `ClientEvent` enum and `EventBus` used by the producer
//! and theatre controllers to notify presentation layers.

mod pipeline_types;
mod session_types;

pub use pipeline_types::{PipelineFailure, StepState};
pub use session_types::{Availability, ExpiryCause, PauseReason, SessionState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Client lifecycle events
///
/// Emitted by the pipeline monitor and the playback session controller.
/// Presentation layers subscribe through [`EventBus`]; nothing in the core
/// depends on a subscriber being present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Upload byte progress changed by at least one whole percent
    UploadProgress {
        percent: u8,
        bytes_sent: u64,
        total_bytes: u64,
        timestamp: DateTime<Utc>,
    },

    /// A processing job subscription was opened
    PipelineStarted {
        job_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A progress message was applied to the stepper
    PipelineProgress {
        job_id: String,
        /// Clamped percentage shown on the progress bar
        progress: u8,
        message: String,
        /// Index of the active stage, if any stage has been reached
        active_stage: Option<usize>,
        timestamp: DateTime<Utc>,
    },

    /// Processing finished and produced an access key
    PipelineCompleted {
        job_id: String,
        key: String,
        shards: u32,
        timestamp: DateTime<Utc>,
    },

    /// Processing ended without a result
    PipelineFailed {
        job_id: String,
        failure: PipelineFailure,
        timestamp: DateTime<Utc>,
    },

    /// A playback session was created after authentication
    SessionStarted {
        session_id: Uuid,
        theatre_id: String,
        shard_count: u32,
        window_end: DateTime<Utc>,
        state: SessionState,
        timestamp: DateTime<Utc>,
    },

    /// Countdown crossed a threshold
    SessionStateChanged {
        session_id: Uuid,
        old_state: SessionState,
        new_state: SessionState,
        remaining_secs: i64,
        timestamp: DateTime<Utc>,
    },

    /// Session reached its terminal state
    SessionExpired {
        session_id: Uuid,
        cause: ExpiryCause,
        timestamp: DateTime<Utc>,
    },

    /// Playback paused by the controller rather than the viewer
    PlaybackPaused {
        session_id: Uuid,
        reason: PauseReason,
        timestamp: DateTime<Utc>,
    },

    /// Presentation mode entered or left
    CinemaModeChanged {
        active: bool,
        timestamp: DateTime<Utc>,
    },

    /// A capture-associated input was suppressed
    CaptureSuppressed {
        /// Short label of what was blocked, e.g. `"context-menu"` or `"Ctrl+S"`
        input: String,
        timestamp: DateTime<Utc>,
    },

    /// Backend availability changed
    AvailabilityChanged {
        availability: Availability,
        timestamp: DateTime<Utc>,
    },
}

impl ClientEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &'static str {
        match self {
            ClientEvent::UploadProgress { .. } => "UploadProgress",
            ClientEvent::PipelineStarted { .. } => "PipelineStarted",
            ClientEvent::PipelineProgress { .. } => "PipelineProgress",
            ClientEvent::PipelineCompleted { .. } => "PipelineCompleted",
            ClientEvent::PipelineFailed { .. } => "PipelineFailed",
            ClientEvent::SessionStarted { .. } => "SessionStarted",
            ClientEvent::SessionStateChanged { .. } => "SessionStateChanged",
            ClientEvent::SessionExpired { .. } => "SessionExpired",
            ClientEvent::PlaybackPaused { .. } => "PlaybackPaused",
            ClientEvent::CinemaModeChanged { .. } => "CinemaModeChanged",
            ClientEvent::CaptureSuppressed { .. } => "CaptureSuppressed",
            ClientEvent::AvailabilityChanged { .. } => "AvailabilityChanged",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for client events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use cshield_common::events::{ClientEvent, EventBus};
///
/// let bus = EventBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(ClientEvent::CinemaModeChanged {
///     active: true,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(matches!(rx.try_recv(), Ok(ClientEvent::CinemaModeChanged { active: true, .. })));
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ClientEvent,
    ) -> Result<usize, broadcast::error::SendError<ClientEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
