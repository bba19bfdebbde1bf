//! Shared helpers for producer integration tests

pub mod mock_backend;
