// Crate root - export modules
pub mod board;
pub mod cache;
pub mod zobrist;

pub use board::search::{
    smp_search, EvalParams, InfoCallback, ScoreType, SearchInfo, SearchLimits, SearchParams,
    SearchResults, SearchState, DEFAULT_TT_MB,
};
pub use board::{Bitboard, Color, Move, MoveKind, MoveList, Piece, Square};
pub use board::{Board, FenError, MoveParseError};
