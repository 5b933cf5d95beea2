//! Castling rights bitmask.
//!
//! Per color the rights form {NONE, SHORT, LONG, ALL}; the four flags are
//! packed into one byte.

use super::piece::Color;

pub(crate) const CASTLE_WHITE_K: u8 = 0b0001;
pub(crate) const CASTLE_WHITE_Q: u8 = 0b0010;
pub(crate) const CASTLE_BLACK_K: u8 = 0b0100;
pub(crate) const CASTLE_BLACK_Q: u8 = 0b1000;

pub(crate) const ALL_CASTLING_RIGHTS: u8 =
    CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

/// Bit for a (color, side) pair; side is 'K' or 'Q'.
#[inline]
pub(crate) const fn castle_bit(color: Color, side: char) -> u8 {
    match (color, side) {
        (Color::White, 'K') => CASTLE_WHITE_K,
        (Color::White, _) => CASTLE_WHITE_Q,
        (Color::Black, 'K') => CASTLE_BLACK_K,
        (Color::Black, _) => CASTLE_BLACK_Q,
    }
}
