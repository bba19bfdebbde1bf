//! Relative endpoint paths of the CinemaShield backend

/// Multipart upload of a movie file
pub const UPLOAD: &str = "/api/upload";

/// Processing history (newest first)
pub const HISTORY: &str = "/api/history";

/// Audit trail (newest first)
pub const AUDIT_LOG: &str = "/api/audit-log";

/// Playback availability
pub const STATUS: &str = "/api/status";

/// Access key exchange
pub const AUTHENTICATE: &str = "/api/authenticate";

/// Server-Sent Events progress stream for one processing job
pub fn process(job_id: &str) -> String {
    format!("/api/process/{}", job_id)
}

/// Token-scoped media stream, handed to the media surface as-is
pub fn stream(token: &str) -> String {
    format!("/api/stream/{}", token)
}

/// Server-side expiry check for a playback token
pub fn check_expiry(token: &str) -> String {
    format!("/api/check-expiry/{}", token)
}
