//! Board representation and game logic.
//!
//! Bitboard position with staged legal move generation, reversible
//! make/unmake, FEN and PACN I/O, static exchange evaluation, and the
//! tapered evaluator.
//!
//! # Example
//! ```
//! use basalt::Board;
//!
//! let board = Board::new();
//! let moves = board.generate_moves();
//! assert_eq!(moves.len(), 20);
//! ```

pub mod search;

mod attack_tables;
mod error;
mod eval;
mod eval_terms;
mod fen;
mod make_unmake;
mod movegen;
mod pst;
mod see;
mod state;
mod types;

#[cfg(test)]
mod tests;

// Public API
pub use error::{FenError, MoveParseError, SquareParseError};
pub use eval::EvalParams;
pub use state::Board;
pub use types::{Bitboard, Color, Move, MoveKind, MoveList, Piece, ScoredMove, Square};

// Internal shorthands shared by the board submodules
pub(crate) use types::{
    castle_bit, ALL_CASTLING_RIGHTS, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K,
    CASTLE_WHITE_Q, MAX_PLY, PROMOTION_PIECES,
};
