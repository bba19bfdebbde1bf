//! Pipeline-related type definitions
//!
//! Supporting types for the processing progress stepper.

use serde::{Deserialize, Serialize};

/// Display state of one stepper stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Not reached yet
    #[default]
    Pending,
    /// Currently running
    Active,
    /// Finished
    Done,
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepState::Pending => write!(f, "pending"),
            StepState::Active => write!(f, "active"),
            StepState::Done => write!(f, "done"),
        }
    }
}

/// Why a processing job ended without a result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineFailure {
    /// Backend sent an explicit `error` message
    Reported { message: String },
    /// Channel closed or errored without a terminal message
    ConnectionLost,
}

impl std::fmt::Display for PipelineFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineFailure::Reported { message } => write!(f, "{}", message),
            PipelineFailure::ConnectionLost => write!(f, "Connection lost"),
        }
    }
}
