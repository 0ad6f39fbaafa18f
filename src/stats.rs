//! Decode statistics.
//!
//! Drops never reach the UI. These counters are the only trace they leave,
//! read by the main loop for a diagnostics screen or a periodic log line.

use core::sync::atomic::{AtomicU32, Ordering};

/// Why the decoder did not store a key code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum DropReason {
    /// Previous key not consumed yet.
    MailboxFull = 0,
    /// Left and right captured together.
    AmbiguousHorizontal = 1,
    /// Up and down captured together.
    AmbiguousVertical = 2,
    /// Interrupt with no captured edge.
    Spurious = 3,
    /// Several lines captured that have no key code (e.g. menu + up).
    Unmapped = 4,
}

impl DropReason {
    /// Number of reasons, used to size counter tables.
    pub const COUNT: usize = 5;

    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::MailboxFull => "mailbox full",
            DropReason::AmbiguousHorizontal => "left+right",
            DropReason::AmbiguousVertical => "up+down",
            DropReason::Spurious => "spurious",
            DropReason::Unmapped => "unmapped",
        }
    }
}

/// Per-reason drop counters plus the number of stored keys.
///
/// Written from the interrupt handler, read anywhere. Counters wrap on
/// overflow.
pub struct DropStats {
    stored: AtomicU32,
    dropped: [AtomicU32; DropReason::COUNT],
}

impl DropStats {
    pub const fn new() -> Self {
        Self {
            stored: AtomicU32::new(0),
            dropped: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
        }
    }

    #[inline]
    pub fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_drop(&self, reason: DropReason) {
        self.dropped[reason as usize].fetch_add(1, Ordering::Relaxed);
    }

    /// Keys handed to the mailbox since boot (or last reset).
    #[inline]
    pub fn stored(&self) -> u32 {
        self.stored.load(Ordering::Relaxed)
    }

    /// Drops for one reason.
    #[inline]
    pub fn dropped(&self, reason: DropReason) -> u32 {
        self.dropped[reason as usize].load(Ordering::Relaxed)
    }

    /// Drops for all reasons combined.
    pub fn total_dropped(&self) -> u32 {
        self.dropped
            .iter()
            .fold(0u32, |acc, c| acc.wrapping_add(c.load(Ordering::Relaxed)))
    }

    pub fn reset(&self) {
        self.stored.store(0, Ordering::Relaxed);
        for counter in &self.dropped {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Get a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            stored: self.stored(),
            mailbox_full: self.dropped(DropReason::MailboxFull),
            ambiguous_horizontal: self.dropped(DropReason::AmbiguousHorizontal),
            ambiguous_vertical: self.dropped(DropReason::AmbiguousVertical),
            spurious: self.dropped(DropReason::Spurious),
            unmapped: self.dropped(DropReason::Unmapped),
        }
    }
}

impl Default for DropStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub stored: u32,
    pub mailbox_full: u32,
    pub ambiguous_horizontal: u32,
    pub ambiguous_vertical: u32,
    pub spurious: u32,
    pub unmapped: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_per_reason() {
        let stats = DropStats::new();
        stats.record_drop(DropReason::Spurious);
        stats.record_drop(DropReason::Spurious);
        stats.record_drop(DropReason::MailboxFull);
        stats.record_stored();

        let snap = stats.snapshot();
        assert_eq!(snap.spurious, 2);
        assert_eq!(snap.mailbox_full, 1);
        assert_eq!(snap.stored, 1);
        assert_eq!(stats.total_dropped(), 3);

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
