//! Error types for cshield-theatre

use thiserror::Error;

/// Main error type for the theatre client
#[derive(Error, Debug)]
pub enum Error {
    /// Shared configuration / protocol / server errors
    #[error(transparent)]
    Common(#[from] cshield_common::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Terminal I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation needs an active, unexpired session
    #[error("No active playback session")]
    NoSession,
}

/// Convenience Result type using the theatre Error
pub type Result<T> = std::result::Result<T, Error>;

/// Why an access key exchange did not produce a session
///
/// `Display` is the inline message shown next to the key field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Blank input; nothing was sent
    #[error("Enter an access key")]
    EmptyKey,

    /// A previous exchange has not finished yet
    #[error("Authentication already in progress")]
    InFlight,

    /// Backend refused the key
    #[error("{reason}")]
    Rejected { reason: String },

    /// Request never got an answer
    #[error("Connection error: {0}")]
    Connection(String),

    /// A session started, expired or was torn down while the request was in flight
    #[error("Session changed while authenticating; try again")]
    Stale,
}

impl AuthError {
    /// Fallback reason when the backend gives none
    pub const DEFAULT_REASON: &'static str = "Authentication failed";

    /// Map a backend call failure to the inline reason
    pub fn from_api(err: Error) -> Self {
        match err {
            Error::Common(cshield_common::Error::Server { message, .. }) => AuthError::Rejected {
                reason: if message.trim().is_empty() {
                    Self::DEFAULT_REASON.to_string()
                } else {
                    message
                },
            },
            Error::Http(e) | Error::Common(cshield_common::Error::Http(e)) => {
                AuthError::Connection(e.to_string())
            }
            other => AuthError::Rejected {
                reason: format!("{}: {}", Self::DEFAULT_REASON, other),
            },
        }
    }
}
