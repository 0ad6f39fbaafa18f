//! # PanelInput
//!
//! Front-panel input path of the instrument: two rotary encoders and a
//! push-button on a PIO block, decoded in interrupt context into one key
//! code for the polling main loop.
//!
//! ## Architecture
//!
//! ```text
//! PIO edge capture ──IRQ──▶ EdgeDecoder ──offer──▶ KeyMailbox ──get_key──▶ main loop
//!        ▲                                             (one slot)
//!        └── InterruptController (setup: register, unmask, clear)
//! ```
//!
//! - At most one key is pending; newer events are dropped, never queued
//! - Ambiguous readings (left+right, up+down) and empty readings are dropped
//! - Nothing allocates; every shared object is a `static`

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod decoder;
pub mod fault;
pub mod irq;
pub mod key;
pub mod log_drain;
pub mod log_globals;
pub mod logging;
pub mod mailbox;
pub mod pio;
pub mod stats;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use config::{PanelConfig, PANEL_CONFIG};
pub use decoder::{Decoded, EdgeDecoder};
pub use fault::{FaultCode, FaultState};
pub use irq::{InstallError, InterruptController, IrqLine, IrqRegistrar, IsrFn};
pub use key::{EdgeMask, KeyCode, ENABLE_INT};
pub use log_globals::{ISR_LOG_STREAM, MAIN_LOG_STREAM};
pub use mailbox::{get_key, key_available, KeyMailbox, KEY_MAILBOX};
pub use pio::{MmioPio, PioRegisters, SimulatedPio};
pub use stats::{DropReason, DropStats};
