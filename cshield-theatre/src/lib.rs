//! # CinemaShield Theatre Client
//!
//! Exchanges an access key for a time-bounded playback session and
//! enforces the session's window on the client:
//! - [`authenticator`]: key exchange, one request at a time
//! - [`session`]: the playback session controller and its seams
//! - [`status`]: availability polling

pub mod api;
pub mod authenticator;
pub mod console;
pub mod error;
pub mod session;
pub mod status;

pub use api::{HttpTheatreApi, TheatreApi};
pub use authenticator::SessionAuthenticator;
pub use error::{AuthError, Error, Result};
pub use session::{MediaSurface, PlaybackController, SessionInfo};
pub use status::StatusMonitor;
