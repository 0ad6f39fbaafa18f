//! Encoder interrupt source setup.
//!
//! Registers the decoder's handler, unmasks the monitored lines and drops
//! edges latched before setup so the first interrupt reflects a real turn.
//!
//! # Rules
//!
//! - Registration must succeed before any mask bit is enabled
//! - Stale edges are cleared after the mask is written, in that order
//! - Registration failure is not recoverable here: it is retried, then
//!   latched as a fault once the configured attempt limit is reached

use core::ffi::c_void;

use crate::config::{ConfigError, PanelConfig};
use crate::fault::{FaultCode, FaultState};
use crate::key::ENABLE_INT;
use crate::log_globals::MAIN_LOG_STREAM;
use crate::logging::LogStream;
use crate::pio::PioRegisters;
use crate::{plog_error, plog_info, plog_warn};

/// Interrupt handler entry point.
///
/// Registered with a null context pointer; handlers reach their state
/// through statics.
pub type IsrFn = unsafe extern "C" fn(context: *mut c_void);

/// Interrupt controller and line a peripheral is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IrqLine {
    pub controller_id: u32,
    pub irq_id: u32,
}

/// Platform interrupt registration.
pub trait IrqRegistrar {
    /// Attach `handler` to `line` with null context and flags.
    ///
    /// Returns the platform status code on failure.
    fn register(&mut self, line: IrqLine, handler: IsrFn) -> Result<(), i32>;
}

/// Why [`InterruptController::install_and_enable`] gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallError {
    /// Configuration rejected before touching hardware.
    InvalidConfig(ConfigError),
    /// Every registration attempt failed.
    RetriesExhausted { attempts: u32, last_status: i32 },
}

impl InstallError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig(err) => err.code(),
            Self::RetriesExhausted { .. } => "E10",
        }
    }
}

impl core::fmt::Display for InstallError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "{}", err),
            Self::RetriesExhausted {
                attempts,
                last_status,
            } => write!(
                f,
                "{}: irq registration failed {} times (last status {})",
                self.code(),
                attempts,
                last_status
            ),
        }
    }
}

/// Sets up the encoder interrupt on a PIO block.
pub struct InterruptController<'a, P: PioRegisters> {
    pio: &'a P,
    config: PanelConfig,
    fault: &'a FaultState,
    log: &'a LogStream,
}

impl<'a, P: PioRegisters> InterruptController<'a, P> {
    /// Create a controller logging to the main-loop stream.
    pub fn new(pio: &'a P, config: PanelConfig, fault: &'a FaultState) -> Self {
        Self {
            pio,
            config,
            fault,
            log: &MAIN_LOG_STREAM,
        }
    }

    /// Log to a different stream.
    pub fn with_log(mut self, log: &'a LogStream) -> Self {
        self.log = log;
        self
    }

    /// Register `handler`, enable the monitored lines, clear stale edges.
    ///
    /// Returns the number of registration attempts used. On error the
    /// reason is also latched in the fault state and the lines stay masked.
    pub fn install_and_enable<R: IrqRegistrar>(
        &self,
        registrar: &mut R,
        handler: IsrFn,
    ) -> Result<u32, InstallError> {
        if let Err(err) = self.config.validate() {
            self.fault.latch(FaultCode::InvalidConfig, err as u32);
            plog_error!(self.log, "panel config rejected: {}", err);
            return Err(InstallError::InvalidConfig(err));
        }

        let attempts = self.register_with_retry(registrar, handler)?;

        self.pio.set_irq_mask(ENABLE_INT);
        self.pio.clear_edge_capture(ENABLE_INT);

        plog_info!(
            self.log,
            "panel irq {}/{} enabled, {} attempt(s)",
            self.config.irq.controller_id,
            self.config.irq.irq_id,
            attempts
        );
        Ok(attempts)
    }

    fn register_with_retry<R: IrqRegistrar>(
        &self,
        registrar: &mut R,
        handler: IsrFn,
    ) -> Result<u32, InstallError> {
        let limit = self.config.registration_attempts;
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let status = match registrar.register(self.config.irq, handler) {
                Ok(()) => return Ok(attempts),
                Err(status) => status,
            };

            plog_warn!(self.log, "irq register failed: status {} (#{})", status, attempts);

            if !self.config.retries_forever() && attempts >= limit {
                self.fault.latch(FaultCode::IrqRegistration, attempts);
                plog_error!(self.log, "irq register gave up after {}", attempts);
                return Err(InstallError::RetriesExhausted {
                    attempts,
                    last_status: status,
                });
            }
        }
    }

    /// Mask every line. The handler stays registered.
    pub fn disable(&self) {
        self.pio.set_irq_mask(0);
    }

    /// Lines currently allowed to raise the interrupt.
    pub fn enabled_mask(&self) -> u32 {
        self.pio.irq_mask()
    }
}
