//! History and audit trail views
//!
//! Both views fetch on demand and keep their previous contents when a
//! refresh fails; a failed refresh is logged at debug, never surfaced.

use cshield_common::api::{AuditEntry, HistoryEntry};
use cshield_common::human_time::format_time_of_day;
use cshield_common::time::parse_iso;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::api::ProducerApi;

/// Maximum number of audit rows rendered
pub const AUDIT_DISPLAY_LIMIT: usize = 100;

/// Visual category of an audit action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditClass {
    Upload,
    Encrypt,
    Shard,
    Manifest,
    Pipeline,
    Playback,
    Failed,
    Other,
}

impl AuditClass {
    /// Classify by substring; the first matching rule wins
    pub fn classify(action: &str) -> Self {
        if action.contains("UPLOAD") {
            AuditClass::Upload
        } else if action.contains("ENCRYPT") {
            AuditClass::Encrypt
        } else if action.contains("SHARD") {
            AuditClass::Shard
        } else if action.contains("MANIFEST") {
            AuditClass::Manifest
        } else if action.contains("PIPELINE") {
            AuditClass::Pipeline
        } else if action.contains("PLAYBACK") && !action.contains("FAIL") {
            AuditClass::Playback
        } else if action.contains("FAIL") || action.contains("EXPIRED") {
            AuditClass::Failed
        } else {
            AuditClass::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuditClass::Upload => "upload",
            AuditClass::Encrypt => "encrypt",
            AuditClass::Shard => "shard",
            AuditClass::Manifest => "manifest",
            AuditClass::Pipeline => "pipeline",
            AuditClass::Playback => "playback",
            AuditClass::Failed => "failed",
            AuditClass::Other => "",
        }
    }
}

/// Render-ready audit row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    /// `HH:MM`, or the raw timestamp if it could not be parsed
    pub time: String,
    pub action: String,
    pub class: AuditClass,
    /// `key: value | key: value`
    pub detail: String,
}

impl AuditRow {
    pub fn from_entry(entry: &AuditEntry) -> Self {
        let time = parse_iso(&entry.timestamp)
            .map(|t| format_time_of_day(&t))
            .unwrap_or_else(|| entry.timestamp.clone());
        let detail = entry
            .details
            .as_ref()
            .map(|details| {
                details
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, detail_value(v)))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .unwrap_or_default();

        Self {
            time,
            action: entry.action.clone(),
            class: AuditClass::classify(&entry.action),
            detail,
        }
    }
}

fn detail_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render-ready history row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRow {
    pub name: String,
    pub shards: u32,
    pub theatre_id: String,
    pub key: String,
}

impl From<&HistoryEntry> for HistoryRow {
    fn from(entry: &HistoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            shards: entry.shards,
            theatre_id: entry.theatre_id.clone(),
            key: entry.key.clone(),
        }
    }
}

/// Processing history list
pub struct HistoryView {
    api: Arc<dyn ProducerApi>,
    rows: Vec<HistoryRow>,
}

impl HistoryView {
    pub fn new(api: Arc<dyn ProducerApi>) -> Self {
        Self { api, rows: Vec::new() }
    }

    /// Re-fetch the list; on failure the previous rows stay
    pub async fn refresh(&mut self) -> &[HistoryRow] {
        match self.api.history().await {
            Ok(entries) => {
                debug!(count = entries.len(), "History refreshed");
                self.rows = entries.iter().map(HistoryRow::from).collect();
            }
            Err(e) => debug!(error = %e, "History refresh failed"),
        }
        &self.rows
    }

    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Audit trail, capped at [`AUDIT_DISPLAY_LIMIT`] rows
pub struct AuditView {
    api: Arc<dyn ProducerApi>,
    rows: Vec<AuditRow>,
}

impl AuditView {
    pub fn new(api: Arc<dyn ProducerApi>) -> Self {
        Self { api, rows: Vec::new() }
    }

    /// Re-fetch the trail; on failure the previous rows stay
    pub async fn refresh(&mut self) -> &[AuditRow] {
        match self.api.audit_log().await {
            Ok(entries) => {
                debug!(count = entries.len(), "Audit log refreshed");
                self.rows = entries
                    .iter()
                    .take(AUDIT_DISPLAY_LIMIT)
                    .map(AuditRow::from_entry)
                    .collect();
            }
            Err(e) => debug!(error = %e, "Audit log refresh failed"),
        }
        &self.rows
    }

    pub fn rows(&self) -> &[AuditRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
