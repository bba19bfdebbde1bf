//! Backend HTTP API surface shared by both clients
//!
//! `types` holds the request/response bodies; `endpoints` builds the
//! relative paths so the two client crates never hand-format URLs.

pub mod endpoints;
pub mod types;

pub use types::{
    AuditEntry, AuthRequest, AuthResponse, ErrorResponse, ExpiryCheckResponse, HistoryEntry,
    MovieInfo, ProgressEvent, StatusResponse, UploadResponse,
};
