//! Common error types for CinemaShield clients

use thiserror::Error;

/// Common result type for CinemaShield operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the producer and theatre clients
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connection refused, timeout, broken body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Backend answered with something we could not interpret
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Backend answered with a non-success status and an error message
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Human-readable reason taken from the response body
        message: String,
    },
}

impl Error {
    /// Human-readable reason suitable for inline display next to a form.
    ///
    /// Server errors surface the backend's own message verbatim; transport
    /// errors get a "Connection error" prefix.
    pub fn user_message(&self) -> String {
        match self {
            Error::Server { message, .. } => message.clone(),
            Error::Http(e) => format!("Connection error: {}", e),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_user_message_is_verbatim() {
        let err = Error::Server {
            status: 401,
            message: "Invalid decryption key".to_string(),
        };
        assert_eq!(err.user_message(), "Invalid decryption key");
        assert_eq!(err.to_string(), "Server error (401): Invalid decryption key");
    }

    #[test]
    fn test_config_error_display() {
        let err = Error::Config("bad url".to_string());
        assert_eq!(err.user_message(), "Configuration error: bad url");
    }
}
