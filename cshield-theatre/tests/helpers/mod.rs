//! Shared helpers for theatre integration tests

pub mod mock_backend;
pub mod surface;
