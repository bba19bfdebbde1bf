//! # CinemaShield Common Library
//!
//! Shared code for the CinemaShield producer and theatre clients:
//! - Wire types for the backend HTTP API
//! - Client event types (ClientEvent enum) and EventBus
//! - Configuration loading
//! - Logging initialisation
//! - Human-readable time and size formatting

pub mod api;
pub mod config;
pub mod error;
pub mod events;
pub mod human_time;
pub mod logging;
pub mod time;

pub use config::ClientConfig;
pub use error::{Error, Result};
