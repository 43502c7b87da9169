//! # Loggers
//!
//! Subscriber setup for binaries. Library code only emits `tracing` events.

/// Console plus rolling-file `tracing` subscriber.
pub mod loggerlocal;

pub use loggerlocal::setup_logging;
