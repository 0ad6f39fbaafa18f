//! Interrupt registration through the ESP-IDF interrupt allocator.

use core::ptr;

use esp_idf_svc::sys::{esp_intr_alloc, intr_handle_t, EspError};

use crate::irq::{IrqLine, IrqRegistrar, IsrFn};

/// Registers handlers with `esp_intr_alloc`.
///
/// `IrqLine::irq_id` is the interrupt matrix source; the allocator picks the
/// CPU interrupt, so `controller_id` is only used in logs.
pub struct EspIntrRegistrar {
    handle: intr_handle_t,
}

impl EspIntrRegistrar {
    pub const fn new() -> Self {
        Self {
            handle: ptr::null_mut(),
        }
    }

    /// Allocator handle of the last successful registration.
    pub fn handle(&self) -> Option<intr_handle_t> {
        (!self.handle.is_null()).then_some(self.handle)
    }
}

impl Default for EspIntrRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqRegistrar for EspIntrRegistrar {
    fn register(&mut self, line: IrqLine, handler: IsrFn) -> Result<(), i32> {
        let mut handle: intr_handle_t = ptr::null_mut();

        // SAFETY: `handler` is a plain function with the allocator's ABI and
        // ignores its null argument; `handle` outlives the call.
        let err = unsafe {
            esp_intr_alloc(
                line.irq_id as i32,
                0,
                Some(handler),
                ptr::null_mut(),
                &mut handle,
            )
        };

        EspError::convert(err).map_err(|e| e.code())?;
        self.handle = handle;
        Ok(())
    }
}
