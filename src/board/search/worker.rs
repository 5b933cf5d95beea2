//! Per-thread search: PVS with iterative deepening and aspiration windows.
//!
//! Each worker owns its board, killers, and history; the transposition and
//! evaluation caches are the only cross-thread channels. Interruption is an
//! explicit `Result` discriminant propagated with `?` and caught only by the
//! iterative-deepening loop of the thread that raised it.

use std::sync::atomic::Ordering;

use once_cell::sync::OnceCell;

use crate::board::types::{Move, Piece, ScoredMoveList};
use crate::board::{Board, MAX_PLY};
use crate::cache::CuckooTable;

use super::entries::{EtEntry, NodeType, TtEntry};
use super::ordering::{order_moves, order_tactical};
use super::score::{
    is_mate_score, mate_score_from_tt, mate_score_to_tt, Interrupt, BUSY_SCORE, DRAW_CLAIMED,
    INSUFFICIENT_MATERIAL, LOSING_CHECK_MATE, MAX_SCORE, MIN_SCORE, NULL_SCORE, STALE_MATE,
    WINNING_CHECK_MATE,
};
use super::tables::{KillerTable, RelativeHistory};
use super::{ScoreType, SearchInfo, SharedSearch};

/// Maximum nominal iterative-deepening depth.
pub(crate) const MAX_NOMINAL_DEPTH: u32 = 64;

const LMR_TABLE_MAX_DEPTH: usize = 64;
const LMR_TABLE_MAX_IDX: usize = 64;

/// Late-move reduction table in plies, indexed by remaining depth (plies) and
/// move index.
fn lmr_table() -> &'static [[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH] {
    static TABLE: OnceCell<[[i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH]> = OnceCell::new();
    TABLE.get_or_init(|| {
        let mut t = [[0i32; LMR_TABLE_MAX_IDX]; LMR_TABLE_MAX_DEPTH];
        for (depth, row) in t.iter_mut().enumerate().skip(1) {
            for (idx, cell) in row.iter_mut().enumerate().skip(1) {
                let val = (0.5 + (depth as f64).ln() * (idx as f64).ln() / 2.3).floor();
                *cell = val.max(0.0) as i32;
            }
        }
        t
    })
}

/// Clears a transposition entry's busy flag on every exit path.
struct BusyGuard<'t> {
    tt: &'t CuckooTable<TtEntry>,
    key: u64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.tt.set_busy(self.key, false);
    }
}

/// Result of one worker's full iterative-deepening run.
#[derive(Clone, Debug)]
pub(crate) struct WorkerOutcome {
    pub(crate) best_move: Option<Move>,
    pub(crate) score: i16,
    pub(crate) score_type: ScoreType,
    pub(crate) depth: u32,
    pub(crate) nodes: u64,
}

pub(crate) struct SearchWorker<'a> {
    pub(crate) board: Board,
    shared: &'a SharedSearch,
    killers: KillerTable,
    history: RelativeHistory,
    /// This worker's root move order; reordered between iterations.
    root_moves: Vec<Move>,
    nodes: u64,
    unflushed: u64,
    seldepth: u32,
    tt_hits: u64,
    et_hits: u64,
    is_master: bool,
}

impl<'a> SearchWorker<'a> {
    pub(crate) fn new(board: Board, shared: &'a SharedSearch, is_master: bool) -> Self {
        SearchWorker {
            board,
            root_moves: shared.root_moves.clone(),
            shared,
            killers: KillerTable::new(),
            history: RelativeHistory::new(),
            nodes: 0,
            unflushed: 0,
            seldepth: 0,
            tt_hits: 0,
            et_hits: 0,
            is_master,
        }
    }

    // =========================================================================
    // Bookkeeping
    // =========================================================================

    /// Count a node and poll the stop conditions.
    fn check_abort(&mut self) -> Result<(), Interrupt> {
        self.nodes += 1;
        self.unflushed += 1;
        if self.unflushed >= 2048 {
            let total = self
                .shared
                .total_nodes
                .fetch_add(self.unflushed, Ordering::Relaxed)
                + self.unflushed;
            self.unflushed = 0;

            if self.shared.node_limit > 0 && total >= self.shared.node_limit {
                self.shared.stop.store(true, Ordering::Relaxed);
                return Err(Interrupt::NodeLimit);
            }
            if self.shared.time_limit_ms > 0
                && self.shared.start.elapsed().as_millis() as u64 >= self.shared.time_limit_ms
            {
                self.shared.stop.store(true, Ordering::Relaxed);
                return Err(Interrupt::Cancelled);
            }
        }
        if self.shared.stop.load(Ordering::Relaxed) {
            return Err(Interrupt::Cancelled);
        }
        Ok(())
    }

    /// Push local counters into the shared statistics.
    pub(crate) fn flush_stats(&mut self) {
        self.shared
            .total_nodes
            .fetch_add(self.unflushed, Ordering::Relaxed);
        self.unflushed = 0;
        self.shared
            .max_seldepth
            .fetch_max(u64::from(self.seldepth), Ordering::Relaxed);
        self.shared.tt_hits.fetch_add(self.tt_hits, Ordering::Relaxed);
        self.shared.et_hits.fetch_add(self.et_hits, Ordering::Relaxed);
        self.tt_hits = 0;
        self.et_hits = 0;
    }

    /// Static evaluation through the shared evaluation cache.
    fn static_eval(&mut self) -> i16 {
        let key = self.board.key();
        if let Some(entry) = self.shared.et.get(key) {
            self.et_hits += 1;
            return entry.score;
        }
        let score = self.board.evaluate(&self.shared.eval_params);
        self.shared.et.put(&EtEntry {
            key,
            score,
            generation: self.shared.generation,
        });
        score
    }

    fn store_tt(&self, depth: i32, dist: i32, score: i16, node_type: NodeType, best_move: Move) {
        self.shared.tt.put(&TtEntry {
            key: self.board.key(),
            depth,
            node_type,
            score: mate_score_to_tt(score, dist as i16),
            best_move,
            generation: self.shared.generation,
            busy: false,
        });
    }

    /// Search a child after `make_move`, taking the board back on interrupt so
    /// the unwind leaves the worker's board at the root.
    fn child(
        &mut self,
        depth: i32,
        dist: i32,
        alpha: i16,
        beta: i16,
        allow_null: bool,
        exclusive: bool,
    ) -> Result<i16, Interrupt> {
        let result = self.pvs(depth, dist, alpha, beta, allow_null, exclusive);
        if result.is_err() {
            self.board.unmake_move();
        }
        result
    }

    fn quiescence_child(&mut self, dist: i32, alpha: i16, beta: i16) -> Result<i16, Interrupt> {
        let result = self.quiescence(dist, alpha, beta);
        if result.is_err() {
            self.board.unmake_move();
        }
        result
    }

    /// True when the last move pushed a pawn to its seventh rank.
    fn last_move_was_pawn_push_to_seventh(&self) -> bool {
        match self.board.last_move() {
            Some(last) if last.piece() == Piece::Pawn => {
                // The push was made by the side that is no longer to move
                let to_rank = last.to().rank();
                if self.board.white_to_move() {
                    to_rank == 1
                } else {
                    to_rank == 6
                }
            }
            _ => false,
        }
    }

    /// True when the side to move still has pieces beyond pawns and king.
    fn has_non_pawn_material(&self) -> bool {
        let stm = self.board.side_to_move();
        let own = self.board.occupied_by(stm).0;
        let pawns = self.board.pieces_of(stm, Piece::Pawn).0;
        let king = self.board.pieces_of(stm, Piece::King).0;
        own & !pawns & !king != 0
    }

    // =========================================================================
    // Interior node search
    // =========================================================================

    /// Principal-variation search. `depth` is fractional; `dist` is plies
    /// from the root (always >= 1 here; the root has its own loop).
    #[allow(clippy::too_many_lines)]
    fn pvs(
        &mut self,
        depth: i32,
        dist: i32,
        mut alpha: i16,
        mut beta: i16,
        allow_null: bool,
        exclusive: bool,
    ) -> Result<i16, Interrupt> {
        self.check_abort()?;
        self.seldepth = self.seldepth.max(dist as u32);

        // Draw claims come before anything else
        if self.board.fifty_move_clock() >= 100 || self.board.has_repeated(1) {
            return Ok(DRAW_CLAIMED);
        }
        if self.board.insufficient_material() {
            return Ok(INSUFFICIENT_MATERIAL);
        }

        // Mate-distance pruning
        let mated_here = LOSING_CHECK_MATE + dist as i16;
        alpha = alpha.max(mated_here);
        beta = beta.min(-mated_here);
        if alpha >= beta {
            return Ok(alpha);
        }

        // The shared reference outlives &mut self borrows taken below
        let shared = self.shared;
        let params = &shared.params;
        let full_ply = params.full_ply;

        if depth < full_ply || dist as usize >= MAX_PLY - 1 {
            return self.quiescence(dist, alpha, beta);
        }

        let is_pv = i32::from(beta) - i32::from(alpha) > 1;
        let key = self.board.key();
        let in_check = self.board.in_check();

        // Transposition table probe
        let mut hash_move = Move::null();
        let mut tt_present = false;
        if let Some(entry) = shared.tt.get(key) {
            self.tt_hits += 1;
            tt_present = true;
            hash_move = entry.best_move;
            if entry.depth >= depth {
                let score = mate_score_from_tt(entry.score, dist as i16);
                let usable = match entry.node_type {
                    NodeType::Exact => !is_pv || (score > alpha && score < beta),
                    NodeType::FailHigh => score >= beta,
                    NodeType::FailLow => score <= alpha,
                };
                if usable {
                    return Ok(score);
                }
            }

            // Node-is-busy coordination: an exclusive caller defers instead of
            // duplicating work another thread has in flight
            if exclusive
                && depth >= params.busy_min_depth_left * full_ply
                && entry.busy
            {
                return Ok(BUSY_SCORE);
            }
        }

        // Mark this node busy while it is being searched; the guard clears the
        // flag on every exit path, including interrupts
        let _busy_guard = if tt_present && depth >= params.busy_min_depth_left * full_ply {
            shared.tt.set_busy(key, true);
            Some(BusyGuard {
                tt: &shared.tt,
                key,
            })
        } else {
            None
        };

        let eval = if in_check { NULL_SCORE } else { self.static_eval() };
        let near_mate = is_mate_score(alpha) || is_mate_score(beta);
        let depth_plies = depth / full_ply;

        // Node-level pruning: never in PV nodes, in check, pawn endings, or
        // near mate scores
        if !is_pv && !in_check && !near_mate && self.has_non_pawn_material() {
            // Reverse razoring (static null-move pruning)
            if (1..=3).contains(&depth_plies) {
                let margin = params.razor_margins[depth_plies as usize];
                let razored = eval.saturating_sub(margin);
                if razored >= beta {
                    return Ok(razored);
                }
            }

            // Null-move pruning
            if allow_null && eval > alpha {
                let mut reduction_plies = params.null_move_reduction;
                if depth_plies > params.null_move_min_depth_left {
                    reduction_plies += params.null_move_extra_reduction;
                }
                let null_depth = depth - full_ply - reduction_plies * full_ply;

                self.board.make_null_move();
                let raw = self.child(null_depth, dist + 1, -beta, -beta + 1, false, false)?;
                self.board.unmake_move();

                let score = -raw;
                if score >= beta {
                    return Ok(score);
                }
            }
        }

        // Internal iterative deepening: fill the hash move at PV nodes
        if is_pv && hash_move == Move::null() && depth >= params.iid_min_depth * full_ply {
            let iid_depth = depth * params.iid_depth_numerator / params.iid_depth_denominator;
            self.pvs(iid_depth, dist, alpha, beta, true, false)?;
            if let Some(entry) = shared.tt.get(key) {
                hash_move = entry.best_move;
            }
        }

        let moves = self.board.generate_moves();
        if moves.is_empty() {
            return Ok(if in_check { mated_here } else { STALE_MATE });
        }

        if hash_move != Move::null() && !self.board.is_legal(hash_move) {
            hash_move = Move::null();
        }

        // Node-level extensions, each a fraction of a ply, jointly capped at
        // one full ply together with the per-move recapture extension
        let mut node_ext = 0;
        if in_check {
            node_ext += params.check_extension;
        }
        if self.last_move_was_pawn_push_to_seventh() {
            node_ext += params.pawn_push_extension;
        }
        if moves.len() == 1 {
            node_ext += params.single_reply_extension;
        }

        let mut ordered = order_moves(
            &self.board,
            &moves,
            hash_move,
            dist as usize,
            &self.killers,
            &self.history,
        );

        let stm = self.board.side_to_move();
        let alpha_orig = alpha;
        let mut best_score = MIN_SCORE;
        let mut best_move = Move::null();
        let mut deferred: Vec<Move> = Vec::new();
        let mut quiets_tried: [Move; 64] = [Move::null(); 64];
        let mut quiets_count = 0usize;
        let mut searched = 0usize;

        for i in 0..ordered.len() {
            let m = ordered.pick_best(i).map(|s| s.mv).unwrap_or(Move::null());
            let is_quiet = !m.is_tactical();

            let mut ext = node_ext;
            if let Some(prev) = self.board.last_move() {
                if m.is_capture() && prev.is_capture() && prev.to() == m.to() {
                    ext += params.recapture_extension;
                }
            }
            let ext = ext.min(full_ply);
            let new_depth = depth - full_ply + ext;

            self.board.make_move(m);
            let gives_check = self.board.in_check();

            // Futility pruning on shallow quiet non-checking moves
            if !is_pv
                && !in_check
                && !near_mate
                && is_quiet
                && !gives_check
                && (1..=5).contains(&depth_plies)
                && eval.saturating_add(params.futility_margins[depth_plies as usize]) <= alpha
            {
                self.board.unmake_move();
                self.history
                    .record_failure(stm, m, params.history_failure_penalty);
                continue;
            }

            let quiets_searched = quiets_count;
            let score;
            if searched == 0 {
                let raw = self.child(new_depth, dist + 1, -beta, -alpha, true, false)?;
                score = -raw;
            } else {
                // Late move reduction for quiet non-checking latecomers
                let mut reduction = 0;
                if !is_pv
                    && is_quiet
                    && !in_check
                    && !gives_check
                    && quiets_searched >= params.lmr_min_quiets
                    && depth_plies >= params.lmr_min_depth
                {
                    let d = (depth_plies as usize).min(LMR_TABLE_MAX_DEPTH - 1);
                    let idx = i.min(LMR_TABLE_MAX_IDX - 1);
                    reduction = (lmr_table()[d][idx] * full_ply).min(new_depth.max(0));
                }

                // Null-window probe; exclusive so a busy node defers the move
                let raw = self.child(
                    new_depth - reduction,
                    dist + 1,
                    -alpha - 1,
                    -alpha,
                    true,
                    exclusive_child(depth, params.busy_min_depth_left, full_ply),
                )?;
                if raw == BUSY_SCORE {
                    self.board.unmake_move();
                    deferred.push(m);
                    continue;
                }
                let mut s = -raw;

                // Reduced probe beat alpha: confirm at full depth
                if reduction > 0 && s > alpha {
                    let raw = self.child(new_depth, dist + 1, -alpha - 1, -alpha, true, false)?;
                    s = -raw;
                }
                // Null-window probe landed inside the window: full re-search
                if s > alpha && s < beta {
                    let raw = self.child(new_depth, dist + 1, -beta, -alpha, true, false)?;
                    s = -raw;
                }
                score = s;
            }

            self.board.unmake_move();
            searched += 1;
            if is_quiet && quiets_count < quiets_tried.len() {
                quiets_tried[quiets_count] = m;
                quiets_count += 1;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    if score >= beta {
                        self.record_cutoff(m, stm, dist, depth_plies, &quiets_tried, quiets_count);
                        self.store_tt(depth, dist, best_score, NodeType::FailHigh, best_move);
                        return Ok(best_score);
                    }
                    alpha = score;
                }
            }
        }

        // Deferred moves: searched with the normal ladder, never exclusive
        for m in deferred {
            let is_quiet = !m.is_tactical();
            let new_depth = depth - full_ply + node_ext.min(full_ply);

            self.board.make_move(m);
            let raw = self.child(new_depth, dist + 1, -alpha - 1, -alpha, true, false)?;
            let mut score = -raw;
            if score > alpha && score < beta {
                let raw = self.child(new_depth, dist + 1, -beta, -alpha, true, false)?;
                score = -raw;
            }
            self.board.unmake_move();
            searched += 1;
            if is_quiet && quiets_count < quiets_tried.len() {
                quiets_tried[quiets_count] = m;
                quiets_count += 1;
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if score > alpha {
                    if score >= beta {
                        self.record_cutoff(m, stm, dist, depth_plies, &quiets_tried, quiets_count);
                        self.store_tt(depth, dist, best_score, NodeType::FailHigh, best_move);
                        return Ok(best_score);
                    }
                    alpha = score;
                }
            }
        }

        if searched == 0 {
            // Every move was pruned away; fail low on the original window
            return Ok(alpha_orig);
        }

        let node_type = if best_score > alpha_orig {
            NodeType::Exact
        } else {
            NodeType::FailLow
        };
        self.store_tt(depth, dist, best_score, node_type, best_move);
        Ok(best_score)
    }

    /// Killer, history, and counter bookkeeping for a beta cutoff.
    fn record_cutoff(
        &mut self,
        m: Move,
        stm: crate::board::Color,
        dist: i32,
        depth_plies: i32,
        quiets_tried: &[Move; 64],
        quiets_count: usize,
    ) {
        if m.is_tactical() {
            return;
        }
        self.killers.add(dist as usize, m);
        self.history.record_success(stm, m, depth_plies);
        for quiet in quiets_tried.iter().take(quiets_count) {
            if *quiet != m {
                self.history
                    .record_failure(stm, *quiet, self.shared.params.history_failure_penalty);
            }
        }
    }

    // =========================================================================
    // Quiescence
    // =========================================================================

    fn quiescence(&mut self, dist: i32, mut alpha: i16, beta: i16) -> Result<i16, Interrupt> {
        self.check_abort()?;
        self.seldepth = self.seldepth.max(dist as u32);

        let in_check = self.board.in_check();

        if in_check {
            // Evade: all legal moves, mate-distance score as the floor
            let moves = self.board.generate_moves();
            if moves.is_empty() {
                return Ok(LOSING_CHECK_MATE + dist as i16);
            }
            let mut best = LOSING_CHECK_MATE + dist as i16;
            if dist as usize >= MAX_PLY - 1 {
                return Ok(best);
            }
            let mut ordered = order_tactical(&moves);
            for i in 0..ordered.len() {
                let m = ordered.pick_best(i).map(|s| s.mv).unwrap_or(Move::null());
                self.board.make_move(m);
                let raw = self.quiescence_child(dist + 1, -beta, -alpha)?;
                self.board.unmake_move();
                let score = -raw;
                if score > best {
                    best = score;
                    if score > alpha {
                        if score >= beta {
                            return Ok(score);
                        }
                        alpha = score;
                    }
                }
            }
            return Ok(best);
        }

        // Stand pat with the static eval as a fail-soft floor
        let stand_pat = self.static_eval();
        if stand_pat >= beta {
            return Ok(stand_pat);
        }
        let mut best = stand_pat;
        if stand_pat > alpha {
            alpha = stand_pat;
        }
        if dist as usize >= MAX_PLY - 1 {
            return Ok(best);
        }

        let shared = self.shared;
        let delta_margin = shared.params.delta_margin;
        let eval_params = &shared.eval_params;
        let moves = self.board.generate_tactical_moves();
        let mut ordered: ScoredMoveList = order_tactical(&moves);
        for i in 0..ordered.len() {
            let m = ordered.pick_best(i).map(|s| s.mv).unwrap_or(Move::null());

            // Delta pruning: skip losing exchanges and captures too small to
            // matter even with the margin
            if self.board.see(m) < 0 {
                continue;
            }
            if let Some(victim) = m.captured() {
                let victim_value = eval_params.material_mg[victim.index()] as i16;
                if stand_pat.saturating_add(victim_value).saturating_add(delta_margin) < alpha {
                    continue;
                }
            }

            self.board.make_move(m);
            let raw = self.quiescence_child(dist + 1, -beta, -alpha)?;
            self.board.unmake_move();
            let score = -raw;
            if score > best {
                best = score;
                if score > alpha {
                    if score >= beta {
                        return Ok(score);
                    }
                    alpha = score;
                }
            }
        }

        Ok(best)
    }

    // =========================================================================
    // Root search and iterative deepening
    // =========================================================================

    /// Search the root move list at a nominal depth with the PVS ladder.
    fn search_root(
        &mut self,
        depth_plies: u32,
        mut alpha: i16,
        beta: i16,
    ) -> Result<(i16, Move), Interrupt> {
        let full_ply = self.shared.params.full_ply;
        let depth = depth_plies as i32 * full_ply;

        if self.board.fifty_move_clock() >= 100 || self.board.has_repeated(1) {
            return Ok((DRAW_CLAIMED, Move::null()));
        }
        if self.board.insufficient_material() {
            return Ok((INSUFFICIENT_MATERIAL, Move::null()));
        }

        let alpha_orig = alpha;
        let mut best_score = MIN_SCORE;
        let mut best_move = Move::null();

        for i in 0..self.root_moves.len() {
            let m = self.root_moves[i];
            let nodes_before = self.nodes;

            self.board.make_move(m);
            let score = if i == 0 {
                -self.child(depth - full_ply, 1, -beta, -alpha, true, false)?
            } else {
                let probe = -self.child(depth - full_ply, 1, -alpha - 1, -alpha, true, false)?;
                if probe > alpha && probe < beta {
                    -self.child(depth - full_ply, 1, -beta, -alpha, true, false)?
                } else {
                    probe
                }
            };
            self.board.unmake_move();

            // Account this move's subtree for the next iteration's ordering
            let spent = self.nodes - nodes_before;
            if let Some(idx) = self.shared.root_moves.iter().position(|rm| *rm == m) {
                self.shared.root_move_nodes[idx].fetch_add(spent, Ordering::Relaxed);
            }

            if score > best_score {
                best_score = score;
                best_move = m;
                if self.is_master {
                    self.report_root_progress(depth_plies, m, i, best_score);
                }
                if score > alpha {
                    if score >= beta {
                        self.store_tt(depth, 0, best_score, NodeType::FailHigh, best_move);
                        return Ok((best_score, best_move));
                    }
                    alpha = score;
                }
            }
        }

        let node_type = if best_score <= alpha_orig {
            NodeType::FailLow
        } else {
            NodeType::Exact
        };
        self.store_tt(depth, 0, best_score, node_type, best_move);
        Ok((best_score, best_move))
    }

    /// Reorder the root moves: by SEE for the first iteration, afterwards by
    /// the accumulated subtree sizes of the previous iteration.
    fn order_root_moves(&mut self, iteration: u32) {
        if iteration <= 1 {
            let board = &self.board;
            self.root_moves.sort_by_key(|m| -board.see(*m));
        } else {
            let shared = self.shared;
            self.root_moves.sort_by_key(|m| {
                let nodes = shared
                    .root_moves
                    .iter()
                    .position(|rm| rm == m)
                    .map(|idx| shared.root_move_nodes[idx].load(Ordering::Relaxed))
                    .unwrap_or(0);
                std::cmp::Reverse(nodes)
            });
        }
    }

    /// Walk the PV out of the transposition table, then restore the board.
    pub(crate) fn extract_pv(&mut self, max_len: usize) -> Vec<Move> {
        let mut pv = Vec::with_capacity(max_len);
        let mut made = 0usize;
        for _ in 0..max_len {
            let Some(entry) = self.shared.tt.get(self.board.key()) else {
                break;
            };
            let mv = entry.best_move;
            if mv == Move::null() || !self.board.is_legal(mv) {
                break;
            }
            pv.push(mv);
            self.board.make_move(mv);
            made += 1;
        }
        for _ in 0..made {
            self.board.unmake_move();
        }
        pv
    }

    fn report_root_progress(&mut self, depth: u32, current: Move, index: usize, score: i16) {
        let shared = self.shared;
        let Some(reporter) = shared.reporter.as_ref() else {
            return;
        };
        let info = self.build_info(depth, score, Some((current, index)));
        reporter(&info);
    }

    fn report_iteration(&mut self, depth: u32, score: i16) {
        let shared = self.shared;
        let Some(reporter) = shared.reporter.as_ref() else {
            return;
        };
        let info = self.build_info(depth, score, None);
        reporter(&info);
        log::debug!(
            "depth {} score {} nodes {} pv {}",
            info.depth,
            info.score,
            info.nodes,
            info.pv
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(" ")
        );
    }

    fn build_info(
        &mut self,
        depth: u32,
        score: i16,
        current: Option<(Move, usize)>,
    ) -> SearchInfo {
        let pv = self.extract_pv(depth as usize);
        let (score_type, reported_score) = if is_mate_score(score) {
            (ScoreType::Mate, super::score::moves_to_mate(score) as i16)
        } else {
            (ScoreType::Exact, score)
        };
        SearchInfo {
            depth,
            seldepth: self.seldepth,
            score: reported_score,
            score_type,
            pv,
            current_move: current.map(|(m, _)| m),
            current_move_index: current.map(|(_, i)| i),
            nodes: self.shared.total_nodes.load(Ordering::Relaxed) + self.unflushed,
            elapsed_ms: self.shared.start.elapsed().as_millis() as u64,
            tt_hits: self.shared.tt_hits.load(Ordering::Relaxed) + self.tt_hits,
            et_hits: self.shared.et_hits.load(Ordering::Relaxed) + self.et_hits,
        }
    }

    /// Iterative deepening to the target nominal depth. Interrupts unwind to
    /// here; the best result found so far is returned.
    pub(crate) fn run(&mut self, target_depth: u32) -> WorkerOutcome {
        let mut score = if self.board.in_check() {
            0
        } else {
            self.static_eval()
        };
        let mut score_type = ScoreType::Exact;
        let mut best_move: Option<Move> = None;
        let mut completed_depth = 0u32;

        'iterations: for iteration in 1..=target_depth {
            self.order_root_moves(iteration);
            self.history.halve();

            let delta = self.shared.params.aspiration_delta;
            let mut alpha = score.saturating_sub(delta).max(MIN_SCORE);
            let mut beta = score.saturating_add(delta).min(MAX_SCORE);
            let mut fail_lows = 0u32;
            let mut fail_highs = 0u32;

            let (iteration_score, iteration_move) = loop {
                match self.search_root(iteration, alpha, beta) {
                    Err(_) => break 'iterations,
                    Ok((s, mv)) => {
                        if mv != Move::null() && s <= alpha {
                            fail_lows += 1;
                            fail_highs = 0;
                            score = s;
                            score_type = ScoreType::UpperBound;
                            alpha = if fail_lows >= 2 {
                                MIN_SCORE
                            } else {
                                s.saturating_sub(delta).max(MIN_SCORE)
                            };
                            continue;
                        }
                        if mv != Move::null() && s >= beta {
                            fail_highs += 1;
                            fail_lows = 0;
                            score = s;
                            score_type = ScoreType::LowerBound;
                            best_move = Some(mv);
                            beta = if fail_highs >= 2 {
                                MAX_SCORE
                            } else {
                                s.saturating_add(delta).min(MAX_SCORE)
                            };
                            continue;
                        }
                        break (s, mv);
                    }
                }
            };

            score = iteration_score;
            score_type = ScoreType::Exact;
            completed_depth = iteration;
            if iteration_move != Move::null() {
                best_move = Some(iteration_move);
            }

            if self.is_master {
                self.report_iteration(iteration, score);
            }

            // No playable move at the root (draw claim): nothing deeper to find
            if iteration_move == Move::null() {
                break;
            }

            // Mate-in-k search limit satisfied
            if let Some(k) = self.shared.mate_in {
                if score >= WINNING_CHECK_MATE - 2 * k as i16 {
                    break;
                }
            }

            if is_mate_score(score) && iteration > (WINNING_CHECK_MATE - score.abs()) as u32 {
                // The mate is fully resolved within the searched horizon
                break;
            }
        }

        self.flush_stats();

        WorkerOutcome {
            best_move,
            score,
            score_type: if is_mate_score(score) {
                ScoreType::Mate
            } else {
                score_type
            },
            depth: completed_depth,
            nodes: self.nodes,
        }
    }
}

/// An inner null-window probe is a cut candidate; it runs exclusively when
/// enough depth remains for the busy handshake to pay off.
#[inline]
fn exclusive_child(depth: i32, busy_min_depth_left: i32, full_ply: i32) -> bool {
    depth >= busy_min_depth_left * full_ply
}
