//! Pipeline progress state machine
//!
//! Pure, synchronous core of the progress monitor: feed it
//! [`ProgressEvent`]s and it maintains the progress bar, status text and
//! stepper. Transport concerns live in [`super::watcher`].
//!
//! ```text
//!            event (non-terminal)
//!          ┌──────────────┐
//!          ▼              │
//!      Running ───────────┘
//!       │   │   └── channel closed ──► Failed(ConnectionLost)
//!       │   └────── `error` ─────────► Failed(Reported)
//!       └────────── `done`  ─────────► Completed
//! ```
//!
//! Terminal states ignore every further input.

use cshield_common::api::ProgressEvent;
use cshield_common::events::{PipelineFailure, StepState};
use serde::Serialize;
use tracing::{debug, warn};

use super::stages::{StageToken, STAGE_COUNT};
use super::stepper::Stepper;

/// Access key and shard count handed to the result presenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub key: String,
    pub shard_count: u32,
}

/// Lifecycle of one monitored job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MonitorStatus {
    Running,
    Completed(PipelineResult),
    Failed(PipelineFailure),
}

impl MonitorStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, MonitorStatus::Running)
    }
}

/// What applying one input did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Already terminal; input dropped
    Ignored,
    /// Progress/message (and possibly stepper) updated
    Progressed,
    Completed(PipelineResult),
    Failed(PipelineFailure),
}

/// Render-ready view of a monitor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonitorSnapshot {
    pub job_id: String,
    pub progress: u8,
    pub message: String,
    pub displayed_stage: Option<usize>,
    pub steps: [StepState; STAGE_COUNT],
    pub status: MonitorStatus,
}

/// Progress monitor for a single job
#[derive(Debug, Clone)]
pub struct ProgressMonitor {
    job_id: String,
    progress: u8,
    message: String,
    stepper: Stepper,
    status: MonitorStatus,
}

impl ProgressMonitor {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            progress: 0,
            message: String::new(),
            stepper: Stepper::new(),
            status: MonitorStatus::Running,
        }
    }

    /// Apply one progress message
    pub fn apply(&mut self, event: &ProgressEvent) -> Applied {
        if self.status.is_terminal() {
            debug!(job_id = %self.job_id, step = %event.step, "Ignoring event after terminal state");
            return Applied::Ignored;
        }

        let token = StageToken::parse(&event.step);

        // Error freezes progress and stepper at their last values
        if token == Some(StageToken::Error) {
            let failure = PipelineFailure::Reported {
                message: event.message.clone(),
            };
            warn!(job_id = %self.job_id, message = %event.message, "Pipeline reported error");
            self.status = MonitorStatus::Failed(failure.clone());
            return Applied::Failed(failure);
        }

        self.progress = event.progress;
        self.message = event.message.clone();

        match token.and_then(StageToken::stage) {
            Some(stage) => {
                self.stepper.advance(stage.index());
            }
            None => debug!(job_id = %self.job_id, step = %event.step, "Unknown step token ignored"),
        }

        if token != Some(StageToken::Done) {
            return Applied::Progressed;
        }

        match &event.key {
            Some(key) => {
                self.stepper.complete_all();
                let result = PipelineResult {
                    key: key.clone(),
                    shard_count: event.shards.unwrap_or(0),
                };
                self.status = MonitorStatus::Completed(result.clone());
                Applied::Completed(result)
            }
            None => {
                let failure = PipelineFailure::Reported {
                    message: "Pipeline finished without an access key".to_string(),
                };
                warn!(job_id = %self.job_id, "Done message carried no key");
                self.status = MonitorStatus::Failed(failure.clone());
                Applied::Failed(failure)
            }
        }
    }

    /// Channel closed or errored without a terminal message
    pub fn connection_lost(&mut self) -> Applied {
        if self.status.is_terminal() {
            return Applied::Ignored;
        }
        warn!(job_id = %self.job_id, "Progress channel lost before a terminal message");
        self.status = MonitorStatus::Failed(PipelineFailure::ConnectionLost);
        Applied::Failed(PipelineFailure::ConnectionLost)
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    pub fn status(&self) -> &MonitorStatus {
        &self.status
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            job_id: self.job_id.clone(),
            progress: self.progress,
            message: self.message.clone(),
            displayed_stage: self.stepper.displayed(),
            steps: *self.stepper.steps(),
            status: self.status.clone(),
        }
    }
}
