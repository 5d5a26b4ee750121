//! Test utilities shared by unit tests, integration tests and the API crate
//!
//! Fixtures build a fully wired in-memory world; assertions cover the
//! checks that repeat across test suites.

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
