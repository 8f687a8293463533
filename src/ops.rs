//! The eleven 16-bit primitives a seed/key program is built from.
//!
//! Every primitive takes the running value plus the step's operand pair
//! `(hh, ll)`. Arithmetic wraps at 16 bits and rotate counts are taken
//! modulo 16, so each function is total over all byte inputs.

use serde::Serialize;
use std::fmt;

/// Opcode byte of a program step.
///
/// Bytes outside the known set decode to [`OpCode::Unknown`] and leave the
/// running value untouched when applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpCode {
    FlipBytes,
    Add,
    Complement,
    AndFlipped,
    RotateLeft,
    OrFlipped,
    RotateRight,
    AddFlipped,
    FlipAdd,
    Subtract,
    SubtractFlipped,
    Unknown(u8),
}

impl OpCode {
    /// Every known opcode, in byte order.
    pub const KNOWN: [OpCode; 11] = [
        OpCode::FlipBytes,
        OpCode::Add,
        OpCode::Complement,
        OpCode::AndFlipped,
        OpCode::RotateLeft,
        OpCode::OrFlipped,
        OpCode::RotateRight,
        OpCode::AddFlipped,
        OpCode::FlipAdd,
        OpCode::Subtract,
        OpCode::SubtractFlipped,
    ];

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x05 => OpCode::FlipBytes,
            0x14 => OpCode::Add,
            0x2A => OpCode::Complement,
            0x37 => OpCode::AndFlipped,
            0x4C => OpCode::RotateLeft,
            0x52 => OpCode::OrFlipped,
            0x6B => OpCode::RotateRight,
            0x75 => OpCode::AddFlipped,
            0x7E => OpCode::FlipAdd,
            0x98 => OpCode::Subtract,
            0xF8 => OpCode::SubtractFlipped,
            other => OpCode::Unknown(other),
        }
    }

    pub fn byte(self) -> u8 {
        match self {
            OpCode::FlipBytes => 0x05,
            OpCode::Add => 0x14,
            OpCode::Complement => 0x2A,
            OpCode::AndFlipped => 0x37,
            OpCode::RotateLeft => 0x4C,
            OpCode::OrFlipped => 0x52,
            OpCode::RotateRight => 0x6B,
            OpCode::AddFlipped => 0x75,
            OpCode::FlipAdd => 0x7E,
            OpCode::Subtract => 0x98,
            OpCode::SubtractFlipped => 0xF8,
            OpCode::Unknown(byte) => byte,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            OpCode::FlipBytes => "SWAP",
            OpCode::Add => "ADD",
            OpCode::Complement => "CPL",
            OpCode::AndFlipped => "ANDF",
            OpCode::RotateLeft => "ROL",
            OpCode::OrFlipped => "ORF",
            OpCode::RotateRight => "ROR",
            OpCode::AddFlipped => "ADDF",
            OpCode::FlipAdd => "SWADD",
            OpCode::Subtract => "SUB",
            OpCode::SubtractFlipped => "SUBF",
            OpCode::Unknown(_) => "NOP",
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, OpCode::Unknown(_))
    }

    /// Apply this opcode to `value` with operand pair `(hh, ll)`.
    pub fn apply(self, value: u16, hh: u8, ll: u8) -> u16 {
        match self {
            OpCode::FlipBytes => flip_bytes(value),
            OpCode::Add => add(value, hh, ll),
            OpCode::Complement => complement(value, hh, ll),
            OpCode::AndFlipped => and_flipped(value, hh, ll),
            OpCode::RotateLeft => rotate_left(value, hh),
            OpCode::OrFlipped => or_flipped(value, hh, ll),
            OpCode::RotateRight => rotate_right(value, ll),
            OpCode::AddFlipped => add_flipped(value, hh, ll),
            OpCode::FlipAdd => flip_add(value, hh, ll),
            OpCode::Subtract => subtract(value, hh, ll),
            OpCode::SubtractFlipped => subtract_flipped(value, hh, ll),
            OpCode::Unknown(_) => value,
        }
    }
}

impl From<u8> for OpCode {
    fn from(byte: u8) -> Self {
        OpCode::from_byte(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

/// `hh:ll` as a big-endian word.
#[inline]
fn word(hh: u8, ll: u8) -> u16 {
    u16::from_be_bytes([hh, ll])
}

/// `ll:hh`, the operand pair read the other way round.
#[inline]
fn flipped_word(hh: u8, ll: u8) -> u16 {
    u16::from_be_bytes([ll, hh])
}

#[inline]
pub fn flip_bytes(value: u16) -> u16 {
    value.swap_bytes()
}

#[inline]
pub fn add(value: u16, hh: u8, ll: u8) -> u16 {
    value.wrapping_add(word(hh, ll))
}

/// One's complement, turned into a two's complement when `hh < ll`.
#[inline]
pub fn complement(value: u16, hh: u8, ll: u8) -> u16 {
    let inverted = !value;
    if hh < ll {
        inverted.wrapping_add(1)
    } else {
        inverted
    }
}

#[inline]
pub fn and_flipped(value: u16, hh: u8, ll: u8) -> u16 {
    value & flipped_word(hh, ll)
}

#[inline]
pub fn rotate_left(value: u16, count: u8) -> u16 {
    value.rotate_left(u32::from(count % 16))
}

#[inline]
pub fn or_flipped(value: u16, hh: u8, ll: u8) -> u16 {
    value | flipped_word(hh, ll)
}

#[inline]
pub fn rotate_right(value: u16, count: u8) -> u16 {
    value.rotate_right(u32::from(count % 16))
}

#[inline]
pub fn add_flipped(value: u16, hh: u8, ll: u8) -> u16 {
    value.wrapping_add(flipped_word(hh, ll))
}

/// Swap bytes, then add the operand in natural order when `hh >= ll` and
/// flipped otherwise.
#[inline]
pub fn flip_add(value: u16, hh: u8, ll: u8) -> u16 {
    let swapped = flip_bytes(value);
    if hh >= ll {
        add(swapped, hh, ll)
    } else {
        add_flipped(swapped, hh, ll)
    }
}

#[inline]
pub fn subtract(value: u16, hh: u8, ll: u8) -> u16 {
    value.wrapping_sub(word(hh, ll))
}

#[inline]
pub fn subtract_flipped(value: u16, hh: u8, ll: u8) -> u16 {
    value.wrapping_sub(flipped_word(hh, ll))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_bytes_round_trip() {
        for op in OpCode::KNOWN {
            assert_eq!(OpCode::from_byte(op.byte()), op);
            assert!(op.is_known());
        }
        assert_eq!(OpCode::from_byte(0x00), OpCode::Unknown(0x00));
        assert_eq!(OpCode::from_byte(0x6C).byte(), 0x6C);
    }

    #[test]
    fn flip_bytes_swaps_halves() {
        assert_eq!(flip_bytes(0x1234), 0x3412);
        assert_eq!(flip_bytes(0x00FF), 0xFF00);
    }

    #[test]
    fn add_and_subtract_wrap() {
        assert_eq!(add(0xFFFF, 0x00, 0x02), 0x0001);
        assert_eq!(add(0x1000, 0x12, 0x34), 0x2234);
        assert_eq!(subtract(0x0001, 0x00, 0x02), 0xFFFF);
        assert_eq!(subtract(0x5000, 0x12, 0x34), 0x3DCC);
    }

    #[test]
    fn flipped_operands_read_ll_high() {
        assert_eq!(add_flipped(0x0000, 0x12, 0x34), 0x3412);
        assert_eq!(subtract_flipped(0x3412, 0x12, 0x34), 0x0000);
        assert_eq!(and_flipped(0xFFFF, 0x0F, 0xF0), 0xF00F);
        assert_eq!(or_flipped(0x0000, 0x01, 0x80), 0x8001);
    }

    #[test]
    fn complement_increments_only_when_hh_below_ll() {
        assert_eq!(complement(0x1234, 0x00, 0x00), 0xEDCB);
        assert_eq!(complement(0x1234, 0x05, 0x01), 0xEDCB);
        assert_eq!(complement(0x1234, 0x01, 0x05), 0xEDCC);
        assert_eq!(complement(0x0000, 0x00, 0x01), 0x0000);
    }

    #[test]
    fn rotations_reduce_count_mod_16() {
        assert_eq!(rotate_left(0x8001, 1), 0x0003);
        assert_eq!(rotate_right(0x8001, 1), 0xC000);
        assert_eq!(rotate_left(0xBEEF, 0), 0xBEEF);
        assert_eq!(rotate_left(0xBEEF, 16), 0xBEEF);
        assert_eq!(rotate_right(0xBEEF, 32), 0xBEEF);
        assert_eq!(rotate_left(0x0001, 17), 0x0002);
        assert_eq!(rotate_right(0x0001, 0xF1), 0x8000);
    }

    #[test]
    fn flip_add_picks_operand_order_from_comparison() {
        // hh >= ll: natural order
        assert_eq!(flip_add(0x1234, 0x02, 0x01), 0x3412 + 0x0201);
        assert_eq!(flip_add(0x1234, 0x01, 0x01), 0x3412 + 0x0101);
        // hh < ll: flipped
        assert_eq!(flip_add(0x1234, 0x01, 0x02), 0x3412 + 0x0201);
        assert_eq!(flip_add(0x1234, 0x00, 0x10), 0x3412 + 0x1000);
    }

    #[test]
    fn rotate_ops_use_their_own_operand() {
        assert_eq!(OpCode::RotateLeft.apply(0x0001, 4, 9), 0x0010);
        assert_eq!(OpCode::RotateRight.apply(0x0010, 9, 4), 0x0001);
    }

    #[test]
    fn unknown_opcode_is_identity() {
        for byte in [0x00u8, 0x01, 0x15, 0xFF] {
            assert_eq!(OpCode::from_byte(byte).apply(0xA5A5, 0x12, 0x34), 0xA5A5);
        }
    }
}
