//! Result Presenter seam
//!
//! Pure display of a finished pipeline run. The monitor hands over the
//! result exactly once; implementations keep no state of their own.

use cshield_common::events::PipelineFailure;

use crate::pipeline::PipelineResult;

/// Displays the outcome of a monitored job
pub trait ResultPresenter: Send + Sync {
    /// Show the derived access key and shard count
    fn present(&self, job_id: &str, result: &PipelineResult);

    /// Surface a terminal failure; the stepper stays frozen
    fn show_failure(&self, job_id: &str, failure: &PipelineFailure) {
        let _ = (job_id, failure);
    }
}

/// Presenter that only logs; used when no display is attached
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl ResultPresenter for LogPresenter {
    fn present(&self, job_id: &str, result: &PipelineResult) {
        tracing::info!(job_id, shards = result.shard_count, "Access key ready");
    }

    fn show_failure(&self, job_id: &str, failure: &PipelineFailure) {
        tracing::warn!(job_id, %failure, "Pipeline failed");
    }
}
