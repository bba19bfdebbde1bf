//! Error types for cshield-producer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the producer client
#[derive(Error, Debug)]
pub enum Error {
    /// Shared configuration / protocol / server errors
    #[error(transparent)]
    Common(#[from] cshield_common::Error),

    /// Transport-level HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Selected file does not exist or is not a regular file
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Selected file has an extension the backend refuses
    #[error("Invalid format {0:?}. Use MP4, MKV, AVI, or MOV.")]
    UnsupportedFormat(String),

    /// Upload rejected by the backend or interrupted
    #[error("{0}")]
    Transfer(String),

    /// Progress channel could not be opened or broke
    #[error("Progress stream error: {0}")]
    Stream(String),
}

/// Convenience Result type using the producer Error
pub type Result<T> = std::result::Result<T, Error>;
