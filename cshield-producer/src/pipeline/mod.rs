//! Pipeline Progress Monitor
//!
//! - [`stages`]: ordered stage list and token lookup table
//! - [`stepper`]: monotonic stage indicator
//! - [`monitor`]: synchronous state machine over progress messages
//! - [`watcher`]: async subscription driving a monitor from the backend

pub mod monitor;
pub mod stages;
pub mod stepper;
pub mod watcher;

pub use monitor::{Applied, MonitorSnapshot, MonitorStatus, PipelineResult, ProgressMonitor};
pub use stages::{stage_index, Stage, StageToken, STAGES, STAGE_COUNT};
pub use stepper::Stepper;
pub use watcher::{PipelineWatcher, Subscription};
