//! Terminal rendering for the producer binary

use cshield_common::events::{PipelineFailure, StepState};
use std::fmt::Write as _;

use crate::pipeline::{MonitorSnapshot, MonitorStatus, PipelineResult, STAGES};
use crate::presenter::ResultPresenter;
use crate::views::{AuditRow, HistoryRow};

/// Presents results on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolePresenter;

impl ResultPresenter for ConsolePresenter {
    fn present(&self, _job_id: &str, result: &PipelineResult) {
        println!();
        println!("Access key: {}", result.key);
        println!("Shards:     {}", result.shard_count);
    }

    fn show_failure(&self, _job_id: &str, failure: &PipelineFailure) {
        eprintln!();
        eprintln!("Pipeline failed: {}", failure);
    }
}

/// Text progress bar, 20 cells wide
pub fn progress_bar(percent: u8) -> String {
    let filled = (percent.min(100) as usize) / 5;
    format!("[{}{}] {:>3}%", "#".repeat(filled), "-".repeat(20 - filled), percent)
}

/// One-line stepper: `✓` done, `▶` active, `·` pending
pub fn stepper_line(steps: &[StepState]) -> String {
    let mut line = String::new();
    for (stage, state) in STAGES.iter().zip(steps) {
        let mark = match state {
            StepState::Done => '✓',
            StepState::Active => '▶',
            StepState::Pending => '·',
        };
        if !line.is_empty() {
            line.push_str("  ");
        }
        let _ = write!(line, "{} {}", mark, stage.label());
    }
    line
}

pub fn render_snapshot(snapshot: &MonitorSnapshot) -> String {
    let mut out = format!("{}  {}", progress_bar(snapshot.progress), snapshot.message);
    out.push('\n');
    out.push_str(&stepper_line(&snapshot.steps));
    if let MonitorStatus::Failed(failure) = &snapshot.status {
        let _ = write!(out, "\n{}", failure);
    }
    out
}

pub fn render_history(rows: &[HistoryRow]) -> String {
    if rows.is_empty() {
        return "No movies processed yet".to_string();
    }
    rows.iter()
        .map(|r| format!("{}  {} shards  {}  {}", r.name, r.shards, r.theatre_id, r.key))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_audit(rows: &[AuditRow]) -> String {
    if rows.is_empty() {
        return "No audit entries".to_string();
    }
    rows.iter()
        .map(|r| {
            let mut line = format!("{}  {:<24}", r.time, r.action);
            if !r.detail.is_empty() {
                let _ = write!(line, "  {}", r.detail);
            }
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::AuditClass;

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0), "[--------------------]   0%");
        assert_eq!(progress_bar(50), "[##########----------]  50%");
        assert_eq!(progress_bar(100), "[####################] 100%");
    }

    #[test]
    fn test_stepper_line_marks_states() {
        let steps = [
            StepState::Done,
            StepState::Active,
            StepState::Pending,
            StepState::Pending,
            StepState::Pending,
        ];
        let line = stepper_line(&steps);
        assert!(line.starts_with("✓ "));
        assert_eq!(line.matches('·').count(), 3);
        assert_eq!(line.matches('▶').count(), 1);
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(render_history(&[]), "No movies processed yet");
        assert_eq!(render_audit(&[]), "No audit entries");
    }

    #[test]
    fn test_audit_line_without_detail() {
        let row = AuditRow {
            time: "09:15".to_string(),
            action: "SERVER_START".to_string(),
            class: AuditClass::Other,
            detail: String::new(),
        };
        assert_eq!(render_audit(&[row]), "09:15  SERVER_START");
    }
}
