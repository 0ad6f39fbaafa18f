//! Fault state management for the panel input path.
//!
//! # Philosophy
//!
//! > A front panel that silently ignores the operator is worse than one
//! > that says it is broken.
//!
//! Nothing in the input path returns errors to the UI. When setup cannot
//! complete, the reason is latched here and the main loop decides how to
//! show it (status LED, splash message, watchdog reset).

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Fault codes indicating why the input path is not running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// Interrupt handler registration kept failing.
    /// Data holds the number of attempts made.
    IrqRegistration = 1,

    /// Panel configuration rejected at startup.
    /// Data holds the `ConfigError` discriminant.
    InvalidConfig = 2,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::IrqRegistration,
            2 => FaultCode::InvalidConfig,
            _ => FaultCode::None,
        }
    }

    /// Human readable reason for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::IrqRegistration => "irq registration failed",
            FaultCode::InvalidConfig => "invalid panel config",
        }
    }
}

/// Thread-safe fault latch.
///
/// Set by setup code, checked by the main loop.
///
/// # Usage
///
/// ```ignore
/// static FAULT: FaultState = FaultState::new();
///
/// if controller.install_and_enable(&mut registrar, encoder_isr).is_err() {
///     // FAULT is already latched with IrqRegistration
/// }
///
/// if FAULT.is_active() {
///     show_panel_fault(FAULT.code());
/// }
/// ```
pub struct FaultState {
    /// True if fault is active.
    active: AtomicBool,

    /// Fault code (reason for fault).
    code: AtomicU8,

    /// Additional data (meaning depends on code).
    data: AtomicU32,

    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch a fault. Increments the fault counter.
    ///
    /// The first fault wins: while a fault is active, later ones are only
    /// counted, so the reported code is the root cause.
    #[inline]
    pub fn latch(&self, code: FaultCode, data: u32) {
        self.count.fetch_add(1, Ordering::Relaxed);
        if self.is_active() {
            return;
        }
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.active.store(true, Ordering::Release);
    }

    /// Check if fault is currently active.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Get fault code (only meaningful if `is_active()` is true).
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    /// Get fault data.
    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    /// Get total fault count since boot.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag. The counter is kept for diagnostics.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Get a snapshot of the current fault state.
    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}
