//! Global log stream instances.
//!
//! One stream per execution context, so each stream has a single producer.

use crate::logging::LogStream;

/// Log stream written only from the encoder interrupt handler.
pub static ISR_LOG_STREAM: LogStream = LogStream::new();

/// Log stream written only from the main loop (setup, consumer side).
pub static MAIN_LOG_STREAM: LogStream = LogStream::new();
