//! Single-slot key mailbox between the encoder interrupt and the main loop.
//!
//! # Architecture
//!
//! ```text
//! EdgeDecoder (ISR) ──offer()──▶ [ cell ] ──get_key()──▶ main loop
//!                                 Illegal = empty
//! ```
//!
//! # Rules
//!
//! - Only the producer moves the cell from `Illegal` to a code
//! - Only the consumer moves it from a code back to `Illegal`
//! - A full cell is never overwritten; the new event is dropped
//! - The consumer's read-then-clear runs inside a critical section

use core::sync::atomic::{AtomicU8, Ordering};

use crate::key::KeyCode;

const EMPTY: u8 = KeyCode::Illegal as u8;

/// Single-producer, single-consumer mailbox holding at most one key code.
///
/// State machine:
///
/// ```text
/// Empty ──offer(code)──▶ Full(code) ──take──▶ Empty
///                        Full(code) ──offer(_)──▶ Full(code)   (dropped)
/// ```
pub struct KeyMailbox {
    cell: AtomicU8,
}

impl KeyMailbox {
    /// Create an empty mailbox.
    pub const fn new() -> Self {
        Self {
            cell: AtomicU8::new(EMPTY),
        }
    }

    /// Current content without consuming it. `Illegal` when empty.
    #[inline]
    pub fn peek(&self) -> KeyCode {
        KeyCode::from_u8(self.cell.load(Ordering::Acquire))
    }

    /// True iff a key is waiting. Pure read, never blocks.
    #[inline]
    pub fn key_available(&self) -> bool {
        self.peek().is_valid()
    }

    /// Producer side: store `code` if the mailbox is empty.
    ///
    /// Returns `Err(pending)` with the unconsumed code if the mailbox is
    /// full. Offering `Illegal` stores nothing and succeeds.
    #[inline]
    pub fn offer(&self, code: KeyCode) -> Result<(), KeyCode> {
        if !code.is_valid() {
            return Ok(());
        }

        self.cell
            .compare_exchange(EMPTY, code.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(KeyCode::from_u8)
    }

    /// Consumer side: take the pending key, if any, without waiting.
    #[inline]
    pub fn try_get_key(&self) -> Option<KeyCode> {
        critical_section::with(|_| {
            let code = KeyCode::from_u8(self.cell.load(Ordering::Acquire));
            if code.is_valid() {
                self.cell.store(EMPTY, Ordering::Release);
                Some(code)
            } else {
                None
            }
        })
    }

    /// Consumer side: wait for a key, take it and leave the mailbox empty.
    ///
    /// `wait` runs between polls. Pass a scheduler delay to give the CPU
    /// away while idle. Never returns `Illegal`, has no timeout.
    pub fn get_key_with<W: FnMut()>(&self, mut wait: W) -> KeyCode {
        loop {
            while !self.key_available() {
                wait();
            }
            if let Some(code) = self.try_get_key() {
                return code;
            }
        }
    }

    /// Consumer side: busy-wait for a key, take it and leave the mailbox
    /// empty. Never returns `Illegal`, has no timeout.
    #[inline]
    pub fn get_key(&self) -> KeyCode {
        self.get_key_with(core::hint::spin_loop)
    }

    /// Consumer side: throw away a pending key (e.g. on screen change).
    ///
    /// Returns the discarded code.
    #[inline]
    pub fn discard(&self) -> Option<KeyCode> {
        self.try_get_key()
    }
}

impl Default for KeyMailbox {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide mailbox filled by the encoder interrupt.
pub static KEY_MAILBOX: KeyMailbox = KeyMailbox::new();

/// True iff a key is waiting in [`KEY_MAILBOX`].
#[inline]
pub fn key_available() -> bool {
    KEY_MAILBOX.key_available()
}

/// Busy-wait for the next key from [`KEY_MAILBOX`].
#[inline]
pub fn get_key() -> KeyCode {
    KEY_MAILBOX.get_key()
}
