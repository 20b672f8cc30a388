//! Shared helpers for integration tests.

pub mod header_decoder;
pub mod synthetic;
