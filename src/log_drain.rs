//! Log output from the main loop.
//!
//! Drains [`ISR_LOG_STREAM`] and [`MAIN_LOG_STREAM`] into any text sink:
//! the console UART on the target, stdout on host builds.
//!
//! Output format: `[timestamp_us] LEVEL: message`

use core::fmt::Write;

use crate::log_globals::{ISR_LOG_STREAM, MAIN_LOG_STREAM};
use crate::logging::{LogEntry, LogStream};

/// Write one entry, newline terminated.
pub fn write_log_entry<W: Write>(out: &mut W, entry: &LogEntry) -> core::fmt::Result {
    writeln!(
        out,
        "[{:10}] {}: {}",
        entry.timestamp_us,
        entry.level.as_str(),
        entry.text()
    )
}

/// Drains a fixed set of log streams, interrupt stream first.
pub struct LogDrain<'a> {
    streams: [&'a LogStream; 2],
}

impl LogDrain<'static> {
    /// Drain the two global streams.
    pub fn global() -> Self {
        Self::new(&ISR_LOG_STREAM, &MAIN_LOG_STREAM)
    }
}

impl<'a> LogDrain<'a> {
    pub fn new(isr: &'a LogStream, main: &'a LogStream) -> Self {
        Self {
            streams: [isr, main],
        }
    }

    /// Write every pending entry to `out`.
    ///
    /// Returns the number of entries written. Entries that fail to write are
    /// lost; the sink error is returned after the streams are empty.
    pub fn drain_into<W: Write>(&self, out: &mut W) -> Result<usize, core::fmt::Error> {
        let mut written = 0;
        let mut result = Ok(());

        for stream in self.streams {
            while let Some(entry) = stream.drain() {
                match write_log_entry(out, &entry) {
                    Ok(()) => written += 1,
                    Err(e) => result = Err(e),
                }
            }
        }

        result.map(|()| written)
    }

    /// Write a warning line if any stream dropped entries, then reset the
    /// drop counters. Returns true if a line was written.
    pub fn report_dropped<W: Write>(&self, out: &mut W) -> bool {
        let isr = self.streams[0].dropped();
        let main = self.streams[1].dropped();

        if isr == 0 && main == 0 {
            return false;
        }

        let _ = writeln!(out, "[WARN] log dropped: ISR={}, MAIN={}", isr, main);
        for stream in self.streams {
            stream.reset_dropped();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;

    #[test]
    fn test_format_log_entry() {
        let mut entry = LogEntry::default();
        entry.timestamp_us = 1234567;
        entry.level = LogLevel::Debug;
        entry.len = 14;
        entry.msg[..14].copy_from_slice(b"drop: spurious");

        let mut out = String::new();
        write_log_entry(&mut out, &entry).unwrap();
        assert_eq!(out, "[   1234567] DEBUG: drop: spurious\n");
    }

    #[test]
    fn test_drain_order_isr_first() {
        let isr = LogStream::<32>::new();
        let main = LogStream::<32>::new();
        main.push(1, LogLevel::Info, b"main");
        isr.push(2, LogLevel::Debug, b"isr");

        let drain = LogDrain::new(&isr, &main);
        let mut out = String::new();
        assert_eq!(drain.drain_into(&mut out), Ok(2));

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].ends_with("DEBUG: isr"));
        assert!(lines[1].ends_with("INFO: main"));
        assert_eq!(drain.drain_into(&mut out), Ok(0));
    }

    #[test]
    fn test_report_dropped_resets() {
        let isr = LogStream::<32>::new();
        let main = LogStream::<32>::new();
        for i in 0..33 {
            isr.push(i, LogLevel::Info, b"x");
        }

        let drain = LogDrain::new(&isr, &main);
        let mut out = String::new();
        assert!(drain.report_dropped(&mut out));
        assert_eq!(out, "[WARN] log dropped: ISR=1, MAIN=0\n");
        assert!(!drain.report_dropped(&mut out));
    }
}
