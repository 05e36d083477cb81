//! Shared utilities for the pension verification service.

pub mod logging;
pub mod time;

pub use logging::init_tracing;
pub use time::format_duration;
