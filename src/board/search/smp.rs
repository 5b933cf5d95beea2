//! Parallel search driver.
//!
//! One master plus N-1 helper threads search the same root. Helpers
//! alternate between the master's target depth and one ply deeper, so the
//! shared transposition table fills from multiple horizons; within the tree
//! the node-busy handshake steers threads away from each other's work. A
//! helper that completes before the master publishes its result and requests
//! a stop; the master's unwind then adopts it.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;

use crate::board::{Board, Move};

use super::score::{moves_to_mate, STALE_MATE};
use super::worker::{SearchWorker, WorkerOutcome, MAX_NOMINAL_DEPTH};
use super::{InfoCallback, ScoreType, SearchLimits, SearchResults, SearchState, SharedSearch};

/// Search thread stack size (deep recursion with extensions).
const SEARCH_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Helpers alternate between the target depth and one ply deeper.
fn worker_depth_offset(worker_id: usize) -> u32 {
    (worker_id % 2) as u32
}

/// Run a search over `board` with the caches and configuration in `state`.
///
/// The stop flag is shared with the caller: setting it cancels the search
/// cooperatively, and the search sets it itself once finished so the whole
/// pool winds down. Callers reuse the flag by resetting it between searches.
pub fn smp_search(
    board: &Board,
    state: &mut SearchState,
    limits: &SearchLimits,
    stop: Arc<AtomicBool>,
    reporter: Option<InfoCallback>,
) -> SearchResults {
    state.generation = state.generation.wrapping_add(1);

    let legal = board.generate_moves();
    let mut root_moves: Vec<Move> = legal.iter().copied().collect();
    if let Some(allowed) = &limits.search_moves {
        root_moves.retain(|m| allowed.iter().any(|s| s == &m.to_string()));
        if root_moves.is_empty() {
            // Every requested move was illegal; fall back to the full list
            log::warn!("searchmoves restriction matched no legal move, ignoring it");
            root_moves = legal.iter().copied().collect();
        }
    }

    if root_moves.is_empty() {
        // Checkmated, stalemated, or every requested move is illegal
        let (score, score_type) = if board.in_check() {
            (0, ScoreType::Mate)
        } else {
            (STALE_MATE, ScoreType::Exact)
        };
        return SearchResults {
            best_move: None,
            ponder_move: None,
            score: Some(score),
            score_type: Some(score_type),
        };
    }

    let target_depth = limits
        .max_depth
        .unwrap_or(MAX_NOMINAL_DEPTH)
        .clamp(1, MAX_NOMINAL_DEPTH);
    let num_threads = state.threads.max(1);

    let shared = SharedSearch {
        tt: Arc::clone(&state.tt),
        et: Arc::clone(&state.et),
        stop: Arc::clone(&stop),
        total_nodes: AtomicU64::new(0),
        max_seldepth: AtomicU64::new(0),
        tt_hits: AtomicU64::new(0),
        et_hits: AtomicU64::new(0),
        generation: state.generation,
        params: state.params.clone(),
        eval_params: state.eval_params.clone(),
        root_move_nodes: root_moves.iter().map(|_| AtomicU64::new(0)).collect(),
        root_moves: root_moves.clone(),
        helper_result: Mutex::new(None),
        node_limit: limits.max_nodes.unwrap_or(0),
        time_limit_ms: limits.time_ms.unwrap_or(0),
        mate_in: limits.mate_in,
        start: Instant::now(),
        reporter,
    };

    let outcomes: Vec<(usize, WorkerOutcome)> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(num_threads);
        for id in 0..num_threads {
            let shared_ref = &shared;
            let root_board = board.clone();
            let handle = thread::Builder::new()
                .name(format!("search-{id}"))
                .stack_size(SEARCH_STACK_SIZE)
                .spawn_scoped(s, move || {
                    log::trace!("search worker {id} starting");
                    let mut worker = SearchWorker::new(root_board, shared_ref, id == 0);
                    let depth = (target_depth + worker_depth_offset(id)).min(MAX_NOMINAL_DEPTH);
                    let outcome = worker.run(depth);

                    if id == 0 {
                        // The master is done: wind the helpers down
                        shared_ref.stop.store(true, Ordering::Relaxed);
                    } else if !shared_ref.stop.load(Ordering::Relaxed)
                        && outcome.best_move.is_some()
                    {
                        // Helper finished its full search first: publish and
                        // ask the master to stop
                        let mut slot = shared_ref.helper_result.lock();
                        if slot.is_none() {
                            *slot = Some(outcome.clone());
                        }
                        drop(slot);
                        shared_ref.stop.store(true, Ordering::Relaxed);
                    }

                    log::trace!("search worker {id} finished at depth {}", outcome.depth);
                    (id, outcome)
                })
                .expect("failed to spawn search worker");
            handles.push(handle);
        }
        handles.into_iter().filter_map(|h| h.join().ok()).collect()
    });

    let master = outcomes
        .iter()
        .find(|(id, _)| *id == 0)
        .map(|(_, o)| o.clone());
    let helper = shared.helper_result.lock().clone();

    let outcome = match (master, helper) {
        (Some(m), Some(h)) => {
            if m.best_move.is_none() || h.depth > m.depth {
                h
            } else {
                m
            }
        }
        (Some(m), None) => m,
        (None, Some(h)) => h,
        (None, None) => WorkerOutcome {
            best_move: None,
            score: 0,
            score_type: ScoreType::Exact,
            depth: 0,
            nodes: 0,
        },
    };

    // A cancelled search with nothing completed still answers with some legal move
    let best_move = outcome.best_move.or_else(|| root_moves.first().copied());

    // Expected reply for pondering, read out of the TT through the best move
    let ponder_move = best_move.and_then(|mv| {
        let mut probe = board.clone();
        probe.make_move(mv);
        shared
            .tt
            .get(probe.key())
            .map(|e| e.best_move)
            .filter(|reply| *reply != Move::null() && probe.is_legal(*reply))
    });

    let score = match outcome.score_type {
        ScoreType::Mate => moves_to_mate(outcome.score) as i16,
        _ => outcome.score,
    };

    SearchResults {
        best_move: best_move.map(|m| m.to_string()),
        ponder_move: ponder_move.map(|m| m.to_string()),
        score: Some(score),
        score_type: Some(outcome.score_type),
    }
}
