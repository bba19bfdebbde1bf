//! # CinemaShield Producer Client
//!
//! Uploads movies, follows the processing pipeline to completion and
//! presents the resulting access key. Also exposes the processing history
//! and the audit trail.

pub mod api;
pub mod console;
pub mod error;
pub mod pipeline;
pub mod presenter;
pub mod sse;
pub mod transfer;
pub mod views;

pub use api::{HttpProducerApi, ProducerApi};
pub use error::{Error, Result};
pub use pipeline::{PipelineWatcher, ProgressMonitor};
pub use presenter::ResultPresenter;
pub use transfer::{TransferJob, TransferSubmitter};
