//! Zobrist hashing for chess positions.
//!
//! Provides incrementally-updatable 64-bit position keys for the transposition
//! and evaluation caches. Keys are drawn from a fixed-seed RNG so that builds
//! are deterministic.

use once_cell::sync::Lazy;
use rand::prelude::*;

use crate::board::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece_type][color][square_index]`
    pub(crate) piece_keys: [[[u64; 64]; 2]; 6],
    pub(crate) black_to_move_key: u64,
    /// One key per castling-right bit (white K, white Q, black K, black Q).
    pub(crate) castling_keys: [u64; 4],
    /// `en_passant_keys[file_index]` (only the file matters for the EP target).
    pub(crate) en_passant_keys: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(0x5EED_0F_BA5A17);
        let mut piece_keys = [[[0; 64]; 2]; 6];
        let mut castling_keys = [0; 4];
        let mut en_passant_keys = [0; 8];

        for piece in &mut piece_keys {
            for color in piece.iter_mut() {
                for key in color.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move_key = rng.gen();

        for key in &mut castling_keys {
            *key = rng.gen();
        }

        for key in &mut en_passant_keys {
            *key = rng.gen();
        }

        ZobristKeys {
            piece_keys,
            black_to_move_key,
            castling_keys,
            en_passant_keys,
        }
    }

    /// Key for a piece of a color on a square.
    #[inline]
    pub(crate) fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.piece_keys[piece.index()][color.index()][sq.index()]
    }

    /// XOR-delta for a castling-rights transition.
    #[inline]
    pub(crate) fn castling_delta(&self, old_rights: u8, new_rights: u8) -> u64 {
        let mut changed = old_rights ^ new_rights;
        let mut delta = 0u64;
        while changed != 0 {
            let bit = changed.trailing_zeros() as usize;
            changed &= changed - 1;
            delta ^= self.castling_keys[bit];
        }
        delta
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
