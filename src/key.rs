//! Module: key
//!
//! Purpose: Key codes handed to the UI and the edge bitfield they are decoded
//! from.
//!
//! Architecture:
//! - `EdgeMask` is the raw edge-capture reading, one bit per monitored line
//! - `KeyCode` is what the main loop consumes, one value per recognized edge
//! - The mapping between the two is an explicit table ([`KEY_MAP`]), so a
//!   wiring change only edits the table
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

use bitflags::bitflags;

/// Semantic key code consumed by the main loop.
///
/// Discriminants equal the wiring bit of the line that produces the code,
/// so a stored code can be compared against raw edge bits when debugging
/// on a logic analyzer. Decoding does not rely on this identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyCode {
    /// Push-button pressed.
    Menu = 0x01,
    /// Vertical encoder turned up.
    Up = 0x02,
    /// Vertical encoder turned down.
    Down = 0x04,
    /// Horizontal encoder turned left.
    Left = 0x08,
    /// Horizontal encoder turned right.
    Right = 0x10,
    /// Sentinel: no pending event.
    Illegal = 0xFF,
}

impl KeyCode {
    /// All codes a consumer can receive.
    pub const VALID: [KeyCode; 5] = [
        KeyCode::Menu,
        KeyCode::Up,
        KeyCode::Down,
        KeyCode::Left,
        KeyCode::Right,
    ];

    /// Convert from raw u8 value.
    ///
    /// Values that are not a known code map to `Illegal`.
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x01 => KeyCode::Menu,
            0x02 => KeyCode::Up,
            0x04 => KeyCode::Down,
            0x08 => KeyCode::Left,
            0x10 => KeyCode::Right,
            _ => KeyCode::Illegal,
        }
    }

    /// Raw value as stored in the mailbox cell.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// True for every code except the `Illegal` sentinel.
    #[inline]
    pub const fn is_valid(self) -> bool {
        !matches!(self, KeyCode::Illegal)
    }

    /// Short upper-case name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            KeyCode::Menu => "MENU",
            KeyCode::Up => "UP",
            KeyCode::Down => "DOWN",
            KeyCode::Left => "LEFT",
            KeyCode::Right => "RIGHT",
            KeyCode::Illegal => "ILLEGAL",
        }
    }
}

impl Default for KeyCode {
    fn default() -> Self {
        KeyCode::Illegal
    }
}

impl core::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

bitflags! {
    /// Lines that transitioned since the edge-capture register was last cleared.
    ///
    /// Bit layout follows the PIO wiring:
    /// - Bit 0: push-button
    /// - Bits 1-2: vertical encoder (up, down)
    /// - Bits 3-4: horizontal encoder (left, right)
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EdgeMask: u32 {
        const MENU = 1 << 0;
        const UP = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
        const RIGHT = 1 << 4;
    }
}

/// Every monitored line. Written to the interrupt-mask register to enable
/// the source and to the edge-capture register to clear it.
pub const ENABLE_INT: u32 = EdgeMask::all().bits();

/// Explicit edge → key mapping. Only single-line masks appear here.
pub const KEY_MAP: [(EdgeMask, KeyCode); 5] = [
    (EdgeMask::MENU, KeyCode::Menu),
    (EdgeMask::UP, KeyCode::Up),
    (EdgeMask::DOWN, KeyCode::Down),
    (EdgeMask::LEFT, KeyCode::Left),
    (EdgeMask::RIGHT, KeyCode::Right),
];

impl EdgeMask {
    /// Build from a raw edge-capture reading.
    ///
    /// Bits outside [`ENABLE_INT`] are not monitored lines and are discarded.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self::from_bits_truncate(raw)
    }

    /// Left and right captured together: direction cannot be told apart.
    #[inline]
    pub fn is_ambiguous_horizontal(self) -> bool {
        self.contains(EdgeMask::LEFT | EdgeMask::RIGHT)
    }

    /// Up and down captured together: direction cannot be told apart.
    #[inline]
    pub fn is_ambiguous_vertical(self) -> bool {
        self.contains(EdgeMask::UP | EdgeMask::DOWN)
    }

    /// Key code for this mask, if it names exactly one line.
    pub fn key_code(self) -> Option<KeyCode> {
        KEY_MAP
            .iter()
            .find(|(mask, _)| *mask == self)
            .map(|&(_, code)| code)
    }
}
