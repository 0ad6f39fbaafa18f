//! Module: config
//!
//! Purpose: Board configuration of the front-panel input path.
//!
//! Architecture:
//! - One const [`PanelConfig`] per board, [`PANEL_CONFIG`] is the default
//! - Validated once at startup, before the interrupt is installed
//! - Immutable afterwards; nothing here is changed at runtime
//!
//! Safety: Safe. Plain data.

use crate::irq::IrqLine;

/// Default PIO base address on the front-panel bus.
pub const DEFAULT_PIO_BASE: usize = 0x6000_F000;

/// Default interrupt line of the PIO block.
pub const DEFAULT_IRQ_LINE: IrqLine = IrqLine {
    controller_id: 0,
    irq_id: 16,
};

/// Default registration attempts before the controller gives up.
pub const DEFAULT_REGISTRATION_ATTEMPTS: u32 = 16;

/// Front-panel input configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    /// Base address of the PIO register block.
    pub pio_base: usize,

    /// Interrupt line the PIO block is wired to.
    pub irq: IrqLine,

    /// Handler registration attempts before latching a fault.
    ///
    /// `0` retries forever: setup never returns until registration succeeds.
    pub registration_attempts: u32,
}

/// Configuration of the production board.
pub const PANEL_CONFIG: PanelConfig = PanelConfig::new();

impl PanelConfig {
    pub const fn new() -> Self {
        Self {
            pio_base: DEFAULT_PIO_BASE,
            irq: DEFAULT_IRQ_LINE,
            registration_attempts: DEFAULT_REGISTRATION_ATTEMPTS,
        }
    }

    /// Same configuration with a different attempt limit.
    pub const fn with_registration_attempts(mut self, attempts: u32) -> Self {
        self.registration_attempts = attempts;
        self
    }

    /// True if registration is retried without limit.
    #[inline]
    pub const fn retries_forever(&self) -> bool {
        self.registration_attempts == 0
    }

    /// Check the configuration before touching hardware.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pio_base == 0 {
            return Err(ConfigError::NullBaseAddress);
        }
        if self.pio_base % core::mem::align_of::<u32>() != 0 {
            return Err(ConfigError::MisalignedBaseAddress);
        }
        Ok(())
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration rejected by [`PanelConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConfigError {
    /// E01: PIO base address is zero
    NullBaseAddress = 1,
    /// E02: PIO base address not word aligned
    MisalignedBaseAddress = 2,
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NullBaseAddress => "E01",
            Self::MisalignedBaseAddress => "E02",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NullBaseAddress => "PIO base address is null",
            Self::MisalignedBaseAddress => "PIO base address not word aligned",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
