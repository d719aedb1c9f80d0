//! Servo register word encoding.
//!
//! Each servo register is a 32-bit word:
//!
//! ```text
//!  31            16 15        8 7         0
//! ┌────────────────┬───────────┬───────────┐
//! │ reserved (0)   │  speed    │ position  │
//! └────────────────┴───────────┴───────────┘
//! ```

use core::fmt;

/// Bit shift of the speed field.
pub const SPEED_SHIFT: u32 = 8;

/// Mask of one 8-bit field.
pub const FIELD_MASK: u32 = 0xFF;

/// Encode a register word from position and speed.
#[inline]
pub const fn encode_word(position: u8, speed: u8) -> u32 {
    ((speed as u32) << SPEED_SHIFT) | position as u32
}

/// Convert a position in degrees to the 8-bit register field.
///
/// Fractional degrees are truncated toward zero, then only the low 8 bits
/// are kept.
#[inline]
pub fn position_byte(degrees: f64) -> u8 {
    (degrees.trunc() as i64) as u8
}

/// A decoded view of a register word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterWord(pub u32);

impl RegisterWord {
    /// Build from position and speed.
    #[inline]
    pub const fn new(position: u8, speed: u8) -> Self {
        Self(encode_word(position, speed))
    }

    /// Position field (bits 0..7).
    #[inline]
    pub const fn position(self) -> u8 {
        (self.0 & FIELD_MASK) as u8
    }

    /// Speed field (bits 8..15).
    #[inline]
    pub const fn speed(self) -> u8 {
        ((self.0 >> SPEED_SHIFT) & FIELD_MASK) as u8
    }

    /// Reserved bits 16..31. Always zero for words this crate produces.
    #[inline]
    pub const fn reserved(self) -> u16 {
        (self.0 >> 16) as u16
    }
}

impl fmt::Display for RegisterWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x} (pos={}, speed={})",
            self.0,
            self.position(),
            self.speed()
        )
    }
}
