//! Module: pio
//!
//! Purpose: Register contract of the parallel I/O block that carries the
//! encoder and button lines.
//!
//! Architecture:
//! - [`PioRegisters`] is the narrow contract the decoder and controller use
//! - [`MmioPio`] talks to the real block through volatile 32-bit accesses
//! - [`SimulatedPio`] models the block with atomics for host runs and tests
//!
//! Register map (byte offsets from the base address):
//!
//! ```text
//! +0   data            current line levels (read-only here)
//! +8   interrupt mask  1 = line may raise the interrupt
//! +12  edge capture    1 = line transitioned; writing 1 clears the bit
//! ```
//!
//! Safety: `MmioPio::new` is unsafe; every access after construction is safe.

use core::sync::atomic::{AtomicU32, Ordering};

/// Data register offset.
pub const DATA_OFFSET: usize = 0;
/// Interrupt-mask register offset.
pub const IRQ_MASK_OFFSET: usize = 8;
/// Edge-capture register offset.
pub const EDGE_CAPTURE_OFFSET: usize = 12;

/// Access to the PIO registers used by the input path.
pub trait PioRegisters {
    /// Current input line levels.
    fn data(&self) -> u32;

    /// Current interrupt-mask register value.
    fn irq_mask(&self) -> u32;

    /// Overwrite the interrupt-mask register.
    fn set_irq_mask(&self, mask: u32);

    /// Lines that transitioned since last cleared.
    fn edge_capture(&self) -> u32;

    /// Clear the given bits in the edge-capture register.
    fn clear_edge_capture(&self, bits: u32);
}

/// Memory-mapped PIO block.
pub struct MmioPio {
    base: *mut u32,
}

// SAFETY: The block is a fixed hardware resource; every access is a single
// volatile word read or write with no cached state on our side.
unsafe impl Send for MmioPio {}
unsafe impl Sync for MmioPio {}

impl MmioPio {
    /// Bind to the PIO block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the uncached, word-aligned address of a PIO block with
    /// the register map above, valid for the rest of the program, and no
    /// other code may drive its mask or edge-capture registers.
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            base: base as *mut u32,
        }
    }

    /// Base address this block was bound to.
    pub fn base(&self) -> usize {
        self.base as usize
    }

    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: Guaranteed by the contract of `new`.
        unsafe { self.base.byte_add(offset).read_volatile() }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: Guaranteed by the contract of `new`.
        unsafe { self.base.byte_add(offset).write_volatile(value) }
    }
}

impl PioRegisters for MmioPio {
    #[inline]
    fn data(&self) -> u32 {
        self.read(DATA_OFFSET)
    }

    #[inline]
    fn irq_mask(&self) -> u32 {
        self.read(IRQ_MASK_OFFSET)
    }

    #[inline]
    fn set_irq_mask(&self, mask: u32) {
        self.write(IRQ_MASK_OFFSET, mask)
    }

    #[inline]
    fn edge_capture(&self) -> u32 {
        self.read(EDGE_CAPTURE_OFFSET)
    }

    #[inline]
    fn clear_edge_capture(&self, bits: u32) {
        self.write(EDGE_CAPTURE_OFFSET, bits)
    }
}

/// Software model of the PIO block.
///
/// Lines latch into edge capture through [`SimulatedPio::latch`], the way
/// the hardware does on a transition. Register writes are counted so tests
/// can check the order of mask updates.
pub struct SimulatedPio {
    data: AtomicU32,
    irq_mask: AtomicU32,
    edge_capture: AtomicU32,
    mask_writes: AtomicU32,
    mask_disables: AtomicU32,
    capture_clears: AtomicU32,
}

impl SimulatedPio {
    pub const fn new() -> Self {
        Self {
            data: AtomicU32::new(0),
            irq_mask: AtomicU32::new(0),
            edge_capture: AtomicU32::new(0),
            mask_writes: AtomicU32::new(0),
            mask_disables: AtomicU32::new(0),
            capture_clears: AtomicU32::new(0),
        }
    }

    /// Record transitions on `bits`: levels toggle and edges latch.
    pub fn latch(&self, bits: u32) {
        self.data.fetch_xor(bits, Ordering::AcqRel);
        self.edge_capture.fetch_or(bits, Ordering::AcqRel);
    }

    /// True if the block would assert its interrupt line.
    pub fn irq_pending(&self) -> bool {
        self.edge_capture.load(Ordering::Acquire) & self.irq_mask.load(Ordering::Acquire) != 0
    }

    /// Number of writes to the interrupt-mask register.
    pub fn mask_writes(&self) -> u32 {
        self.mask_writes.load(Ordering::Relaxed)
    }

    /// Number of mask writes that disabled every line.
    pub fn mask_disables(&self) -> u32 {
        self.mask_disables.load(Ordering::Relaxed)
    }

    /// Number of writes to the edge-capture register.
    pub fn capture_clears(&self) -> u32 {
        self.capture_clears.load(Ordering::Relaxed)
    }
}

impl Default for SimulatedPio {
    fn default() -> Self {
        Self::new()
    }
}

impl PioRegisters for SimulatedPio {
    fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    fn irq_mask(&self) -> u32 {
        self.irq_mask.load(Ordering::Acquire)
    }

    fn set_irq_mask(&self, mask: u32) {
        self.mask_writes.fetch_add(1, Ordering::Relaxed);
        if mask == 0 {
            self.mask_disables.fetch_add(1, Ordering::Relaxed);
        }
        self.irq_mask.store(mask, Ordering::Release);
    }

    fn edge_capture(&self) -> u32 {
        self.edge_capture.load(Ordering::Acquire)
    }

    fn clear_edge_capture(&self, bits: u32) {
        self.capture_clears.fetch_add(1, Ordering::Relaxed);
        self.edge_capture.fetch_and(!bits, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mmio_offsets() {
        let mut regs = [0u32; 4];
        let pio = unsafe { MmioPio::new(regs.as_mut_ptr() as usize) };

        pio.set_irq_mask(0x1F);
        pio.clear_edge_capture(0x05);

        assert_eq!(regs[2], 0x1F);
        assert_eq!(regs[3], 0x05);

        regs[0] = 0x0A;
        regs[3] = 0x10;
        let pio = unsafe { MmioPio::new(regs.as_mut_ptr() as usize) };
        assert_eq!(pio.data(), 0x0A);
        assert_eq!(pio.edge_capture(), 0x10);
        assert_eq!(pio.irq_mask(), 0x1F);
    }

    #[test]
    fn test_simulated_latch_and_clear() {
        let pio = SimulatedPio::new();
        pio.latch(0b0110);
        assert_eq!(pio.edge_capture(), 0b0110);
        assert_eq!(pio.data(), 0b0110);

        pio.clear_edge_capture(0b0010);
        assert_eq!(pio.edge_capture(), 0b0100);
        assert_eq!(pio.capture_clears(), 1);
    }

    #[test]
    fn test_simulated_irq_pending_follows_mask() {
        let pio = SimulatedPio::new();
        pio.latch(0b1);
        assert!(!pio.irq_pending());

        pio.set_irq_mask(0b1);
        assert!(pio.irq_pending());

        pio.set_irq_mask(0);
        assert!(!pio.irq_pending());
        assert_eq!(pio.mask_writes(), 2);
        assert_eq!(pio.mask_disables(), 1);
    }
}
