//! Rata Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared plumbing for the rata workspace members. Currently this is the
//! tracing subscriber setup used by every binary.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};
