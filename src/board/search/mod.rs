//! Search: parallel iterative-deepening PVS.
//!
//! Features:
//! - Iterative deepening with aspiration windows
//! - PVS with null-move pruning, reverse razoring, futility pruning, LMR, IID
//! - Check, pawn-push, recapture, and single-reply extensions
//! - Quiescence search with SEE and delta pruning
//! - Shared transposition and evaluation caches
//! - Helper threads coordinated through the caches and a node-busy handshake

mod entries;
mod ordering;
mod params;
mod score;
mod smp;
mod tables;
mod worker;

use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::cache::CuckooTable;

use super::Move;
use entries::{EtEntry, TtEntry};
use worker::WorkerOutcome;

pub use super::eval::EvalParams;
pub use params::SearchParams;
pub use score::Interrupt;
pub use smp::smp_search;

/// Default transposition table size in MB.
pub const DEFAULT_TT_MB: usize = 64;

/// Class of a reported score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreType {
    Exact,
    LowerBound,
    UpperBound,
    Mate,
}

/// Final result of a search.
#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    /// Best move in PACN, if any move is playable.
    pub best_move: Option<String>,
    /// Expected reply for pondering.
    pub ponder_move: Option<String>,
    /// Score in centipawns, or in moves-to-mate form when `score_type` is
    /// `Mate`.
    pub score: Option<i16>,
    pub score_type: Option<ScoreType>,
}

/// Progress report emitted whenever the root best move or score changes and
/// at the end of every iteration.
#[derive(Clone, Debug)]
pub struct SearchInfo {
    pub depth: u32,
    pub seldepth: u32,
    /// Centipawns, or moves-to-mate when `score_type` is `Mate`.
    pub score: i16,
    pub score_type: ScoreType,
    pub pv: Vec<Move>,
    pub current_move: Option<Move>,
    pub current_move_index: Option<usize>,
    pub nodes: u64,
    pub elapsed_ms: u64,
    pub tt_hits: u64,
    pub et_hits: u64,
}

/// Reporter callback for search progress.
pub type InfoCallback = Arc<dyn Fn(&SearchInfo) + Send + Sync>;

/// Disjunctive stop conditions for a search. Every field is optional; the
/// first condition reached stops the search.
#[derive(Clone, Debug, Default)]
pub struct SearchLimits {
    /// Maximum nominal iterative-deepening depth.
    pub max_depth: Option<u32>,
    /// Maximum total nodes across all threads.
    pub max_nodes: Option<u64>,
    /// Fixed search time in milliseconds.
    pub time_ms: Option<u64>,
    /// Stop as soon as a mate in at most this many moves is proven.
    pub mate_in: Option<u32>,
    /// Ponder/infinite flag: ignore depth defaults and run until stopped.
    pub infinite: bool,
    /// Restrict the root to these moves, in PACN.
    pub search_moves: Option<Vec<String>>,
}

impl SearchLimits {
    /// Fixed-depth limits.
    #[must_use]
    pub fn depth(depth: u32) -> Self {
        SearchLimits {
            max_depth: Some(depth),
            ..Default::default()
        }
    }

    /// Fixed-time limits.
    #[must_use]
    pub fn time(time_ms: u64) -> Self {
        SearchLimits {
            time_ms: Some(time_ms),
            ..Default::default()
        }
    }

    /// Node-count limits.
    #[must_use]
    pub fn nodes(nodes: u64) -> Self {
        SearchLimits {
            max_nodes: Some(nodes),
            ..Default::default()
        }
    }
}

/// Caches and configuration persisted across searches.
pub struct SearchState {
    tt: Arc<CuckooTable<TtEntry>>,
    et: Arc<CuckooTable<EtEntry>>,
    generation: u8,
    pub params: SearchParams,
    pub eval_params: EvalParams,
    /// Total thread count: one master plus N-1 helpers.
    pub threads: usize,
}

impl SearchState {
    #[must_use]
    pub fn new(tt_mb: usize) -> Self {
        SearchState {
            tt: Arc::new(CuckooTable::new(tt_mb.max(1))),
            et: Arc::new(CuckooTable::new((tt_mb / 4).max(1))),
            generation: 0,
            params: SearchParams::default(),
            eval_params: EvalParams::default(),
            threads: 1,
        }
    }

    /// Replace both caches with freshly sized ones.
    pub fn resize(&mut self, tt_mb: usize) {
        self.tt = Arc::new(CuckooTable::new(tt_mb.max(1)));
        self.et = Arc::new(CuckooTable::new((tt_mb / 4).max(1)));
    }

    /// Clear both caches in place.
    pub fn clear(&self) {
        self.tt.clear();
        self.et.clear();
    }

    /// Transposition table occupancy estimate in per-mille.
    #[must_use]
    pub fn fill_per_mille(&self) -> u32 {
        self.tt.fill_per_mille()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        SearchState::new(DEFAULT_TT_MB)
    }
}

/// State shared by the master and helper threads of one search.
pub(crate) struct SharedSearch {
    pub(crate) tt: Arc<CuckooTable<TtEntry>>,
    pub(crate) et: Arc<CuckooTable<EtEntry>>,
    pub(crate) stop: Arc<AtomicBool>,
    pub(crate) total_nodes: AtomicU64,
    pub(crate) max_seldepth: AtomicU64,
    pub(crate) tt_hits: AtomicU64,
    pub(crate) et_hits: AtomicU64,
    pub(crate) generation: u8,
    pub(crate) params: SearchParams,
    pub(crate) eval_params: EvalParams,
    /// Canonical root move order; per-move subtree node counters align with it.
    pub(crate) root_moves: Vec<Move>,
    pub(crate) root_move_nodes: Vec<AtomicU64>,
    /// A helper that completes before the master publishes here and stops it.
    pub(crate) helper_result: Mutex<Option<WorkerOutcome>>,
    pub(crate) node_limit: u64,
    pub(crate) time_limit_ms: u64,
    pub(crate) mate_in: Option<u32>,
    pub(crate) start: Instant,
    pub(crate) reporter: Option<InfoCallback>,
}
