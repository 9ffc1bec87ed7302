//! Shared helpers for unit tests.

pub mod clock;
pub mod directory;
