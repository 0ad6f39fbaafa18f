//! Interrupt-safe logging for the panel input path.
//!
//! # Architecture
//!
//! ```text
//! Encoder ISR / main loop     LogStream            LogDrain (main loop)
//! ───────────────────────     ─────────            ────────────────────
//!
//! plog_debug!() ───────────▶ [L0][L1][L2] ───────▶ UART / stdout
//! non-blocking                lock-free            blocking ok
//! ```
//!
//! # Rules
//!
//! - The ISR never formats to a blocking sink, it only pushes into a stream
//! - One producer per stream (see `log_globals`), one drain
//! - Messages are dropped when the ring is full; drops are counted

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

/// Maximum message length.
pub const MAX_MSG_LEN: usize = 64;

/// Log buffer size (number of entries).
pub const LOG_BUFFER_SIZE: usize = 32;

/// Log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    /// Convert to string for output.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// A single log entry.
#[derive(Clone, Copy)]
pub struct LogEntry {
    /// Timestamp in microseconds (tick count on host builds).
    pub timestamp_us: i64,
    /// Log level.
    pub level: LogLevel,
    /// Message length.
    pub len: u8,
    /// Message bytes (not null-terminated).
    pub msg: [u8; MAX_MSG_LEN],
}

impl LogEntry {
    const EMPTY: Self = Self {
        timestamp_us: 0,
        level: LogLevel::Info,
        len: 0,
        msg: [0; MAX_MSG_LEN],
    };

    /// Message text; invalid UTF-8 is replaced by a marker.
    pub fn text(&self) -> &str {
        core::str::from_utf8(&self.msg[..self.len as usize]).unwrap_or("<invalid utf8>")
    }
}

impl Default for LogEntry {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Lock-free single-producer, single-consumer log ring.
///
/// - Push never blocks (drops the message if full)
/// - Entries above the stream's level are discarded before formatting
/// - Drain runs in the main loop at leisure
pub struct LogStream<const N: usize = LOG_BUFFER_SIZE> {
    entries: UnsafeCell<[LogEntry; N]>,
    write_idx: AtomicU32,
    read_idx: AtomicU32,
    dropped: AtomicU32,
    max_level: AtomicU8,
}

// SAFETY: One producer and one consumer per stream. A slot is written only
// while it lies outside [read_idx, write_idx) and read only while inside it;
// the index stores publish the slot contents.
unsafe impl<const N: usize> Sync for LogStream<N> {}
unsafe impl<const N: usize> Send for LogStream<N> {}

impl<const N: usize> LogStream<N> {
    const MASK: usize = N - 1;

    /// Create a new empty log stream that keeps everything up to `Debug`.
    pub const fn new() -> Self {
        Self::with_level(LogLevel::Debug)
    }

    /// Create a new empty log stream with an explicit verbosity.
    pub const fn with_level(max_level: LogLevel) -> Self {
        assert!(N.is_power_of_two(), "Log buffer size must be power of 2");

        Self {
            entries: UnsafeCell::new([LogEntry::EMPTY; N]),
            write_idx: AtomicU32::new(0),
            read_idx: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
            max_level: AtomicU8::new(max_level as u8),
        }
    }

    /// Change verbosity at runtime.
    #[inline]
    pub fn set_level(&self, level: LogLevel) {
        self.max_level.store(level as u8, Ordering::Relaxed);
    }

    /// Current verbosity.
    #[inline]
    pub fn level(&self) -> LogLevel {
        LogLevel::from_u8(self.max_level.load(Ordering::Relaxed))
    }

    /// True if an entry at `level` would be kept.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.level()
    }

    /// Push a log entry (never blocks).
    ///
    /// Returns `true` if the message was queued, `false` if filtered out or
    /// dropped because the ring is full.
    #[inline]
    pub fn push(&self, timestamp_us: i64, level: LogLevel, msg: &[u8]) -> bool {
        if !self.enabled(level) {
            return false;
        }

        let write = self.write_idx.load(Ordering::Relaxed);
        let read = self.read_idx.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N as u32 {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }

        let idx = (write as usize) & Self::MASK;

        // SAFETY: Single producer; the slot is not visible to the consumer
        // until write_idx is advanced below.
        unsafe {
            let entry = &mut (*self.entries.get())[idx];
            let len = msg.len().min(MAX_MSG_LEN);
            entry.timestamp_us = timestamp_us;
            entry.level = level;
            entry.len = len as u8;
            entry.msg[..len].copy_from_slice(&msg[..len]);
        }

        self.write_idx.store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// Drain next log entry.
    ///
    /// Returns `None` if no entries available.
    #[inline]
    pub fn drain(&self) -> Option<LogEntry> {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);

        if read == write {
            return None;
        }

        let idx = (read as usize) & Self::MASK;

        // SAFETY: Single consumer; the slot was published by the producer.
        let entry = unsafe { (*self.entries.get())[idx] };

        self.read_idx.store(read.wrapping_add(1), Ordering::Release);
        Some(entry)
    }

    /// Get count of dropped messages.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Reset dropped counter (e.g., after reporting).
    #[inline]
    pub fn reset_dropped(&self) {
        self.dropped.store(0, Ordering::Relaxed);
    }

    /// Get number of entries waiting to be drained.
    #[inline]
    pub fn pending(&self) -> u32 {
        let read = self.read_idx.load(Ordering::Relaxed);
        let write = self.write_idx.load(Ordering::Acquire);
        write.wrapping_sub(read)
    }
}

impl<const N: usize> Default for LogStream<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a message into a buffer, truncating at the buffer end.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: core::fmt::Arguments<'_>) -> usize {
    let mut writer = BufWriter { buf, pos: 0 };
    let _ = core::fmt::write(&mut writer, args);
    writer.pos
}

/// `core::fmt::Write` over a fixed byte buffer. Output past the end is cut.
struct BufWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl core::fmt::Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let to_write = bytes.len().min(self.buf.len() - self.pos);
        self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
        self.pos += to_write;
        Ok(())
    }
}

/// Microsecond timestamp for log entries.
#[cfg(target_os = "espidf")]
#[inline]
pub fn timestamp_us() -> i64 {
    // SAFETY: esp_timer is started by ESP-IDF before app_main.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

/// Monotonic tick used in place of a clock on host builds.
#[cfg(not(target_os = "espidf"))]
#[inline]
pub fn timestamp_us() -> i64 {
    static TICKS: AtomicU32 = AtomicU32::new(0);
    TICKS.fetch_add(1, Ordering::Relaxed) as i64
}

/// Log into a stream with an explicit level.
///
/// Formatting is skipped entirely when the level is filtered out.
///
/// # Example
///
/// ```ignore
/// plog!(LogLevel::Debug, ISR_LOG_STREAM, "drop {:?}", reason);
/// ```
#[macro_export]
macro_rules! plog {
    ($level:expr, $stream:expr, $($arg:tt)*) => {{
        let level = $level;
        if $stream.enabled(level) {
            let mut buf = [0u8; $crate::logging::MAX_MSG_LEN];
            let len = $crate::logging::format_to_buffer(&mut buf, format_args!($($arg)*));
            $stream.push($crate::logging::timestamp_us(), level, &buf[..len]);
        }
    }};
}

/// Error log.
#[macro_export]
macro_rules! plog_error {
    ($stream:expr, $($arg:tt)*) => {
        $crate::plog!($crate::logging::LogLevel::Error, $stream, $($arg)*)
    };
}

/// Warning log.
#[macro_export]
macro_rules! plog_warn {
    ($stream:expr, $($arg:tt)*) => {
        $crate::plog!($crate::logging::LogLevel::Warn, $stream, $($arg)*)
    };
}

/// Info log.
#[macro_export]
macro_rules! plog_info {
    ($stream:expr, $($arg:tt)*) => {
        $crate::plog!($crate::logging::LogLevel::Info, $stream, $($arg)*)
    };
}

/// Debug log.
#[macro_export]
macro_rules! plog_debug {
    ($stream:expr, $($arg:tt)*) => {
        $crate::plog!($crate::logging::LogLevel::Debug, $stream, $($arg)*)
    };
}

/// Trace log (maximum verbosity).
#[macro_export]
macro_rules! plog_trace {
    ($stream:expr, $($arg:tt)*) => {
        $crate::plog!($crate::logging::LogLevel::Trace, $stream, $($arg)*)
    };
}
