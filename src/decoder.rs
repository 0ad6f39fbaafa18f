//! Encoder interrupt handler body.
//!
//! Turns one edge-capture reading into at most one key code.
//!
//! # Rules
//!
//! - The source is masked for the whole run, so runs never nest
//! - A pending key is never overwritten; newer events are dropped
//! - Left+right and up+down together are ambiguous and dropped
//! - Every latched bit is cleared on exit, stored or not
//! - No error leaves the handler; drops are counted and logged only

use crate::key::{EdgeMask, KeyCode, ENABLE_INT};
use crate::log_globals::ISR_LOG_STREAM;
use crate::logging::LogStream;
use crate::mailbox::KeyMailbox;
use crate::pio::PioRegisters;
use crate::stats::{DropReason, DropStats};
use crate::{plog_debug, plog_trace};

/// Result of one handler run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoded {
    /// Key code placed in the mailbox.
    Stored(KeyCode),
    /// Event discarded.
    Dropped(DropReason),
}

/// Decodes edge-capture readings into the key mailbox.
///
/// Built as a `static` next to the PIO and the mailbox so the interrupt
/// trampoline can reach it:
///
/// ```ignore
/// static DECODER: EdgeDecoder<'static, MmioPio> =
///     EdgeDecoder::new(&PIO, &KEY_MAILBOX, &DROP_STATS);
///
/// unsafe extern "C" fn encoder_isr(_ctx: *mut c_void) {
///     DECODER.on_interrupt();
/// }
/// ```
pub struct EdgeDecoder<'a, P: PioRegisters> {
    pio: &'a P,
    mailbox: &'a KeyMailbox,
    stats: &'a DropStats,
    log: Option<&'a LogStream>,
}

impl<'a, P: PioRegisters> EdgeDecoder<'a, P> {
    /// Create a decoder logging to the interrupt stream.
    pub const fn new(pio: &'a P, mailbox: &'a KeyMailbox, stats: &'a DropStats) -> Self {
        Self {
            pio,
            mailbox,
            stats,
            log: None,
        }
    }

    /// Log to a different stream.
    pub const fn with_log(mut self, log: &'a LogStream) -> Self {
        self.log = Some(log);
        self
    }

    #[inline]
    fn log(&self) -> &LogStream {
        self.log.unwrap_or(&ISR_LOG_STREAM)
    }

    /// Handle one encoder interrupt.
    pub fn on_interrupt(&self) -> Decoded {
        self.pio.set_irq_mask(0);

        let raw = self.pio.edge_capture();
        let edges = EdgeMask::from_raw(raw);
        let decoded = self.arbitrate(edges);

        match decoded {
            Decoded::Stored(code) => {
                self.stats.record_stored();
                plog_trace!(self.log(), "key {}", code);
            }
            Decoded::Dropped(reason) => {
                self.stats.record_drop(reason);
                plog_debug!(self.log(), "drop {:#04x}: {}", edges.bits(), reason.as_str());
            }
        }

        self.pio.set_irq_mask(ENABLE_INT);
        self.pio.clear_edge_capture(raw);

        decoded
    }

    /// First matching rule wins.
    fn arbitrate(&self, edges: EdgeMask) -> Decoded {
        if self.mailbox.key_available() {
            return Decoded::Dropped(DropReason::MailboxFull);
        }
        if edges.is_ambiguous_horizontal() {
            return Decoded::Dropped(DropReason::AmbiguousHorizontal);
        }
        if edges.is_ambiguous_vertical() {
            return Decoded::Dropped(DropReason::AmbiguousVertical);
        }
        if edges.is_empty() {
            return Decoded::Dropped(DropReason::Spurious);
        }

        let Some(code) = edges.key_code() else {
            return Decoded::Dropped(DropReason::Unmapped);
        };

        match self.mailbox.offer(code) {
            Ok(()) => Decoded::Stored(code),
            Err(_) => Decoded::Dropped(DropReason::MailboxFull),
        }
    }
}
