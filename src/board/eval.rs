//! Tapered static evaluation.
//!
//! Every term carries a middlegame/endgame weight pair; the two sums are
//! blended by the phase score. All terms are computed symmetrically per color
//! and subtracted, so mirroring the board and swapping colors negates the
//! score exactly, up to the side-to-move tempo bonus and the immediate-capture
//! bias which are applied after the blend.

use super::eval_terms::activity::AttackContext;
use super::pst::{pst_index, PHASE_TOTAL, PHASE_WEIGHTS, PST_EG, PST_MG};
use super::types::{Bitboard, Color, Piece};
use super::Board;

/// Largest magnitude the static evaluation may return. Keeps eval scores
/// clear of the mate and sentinel ranges.
pub(crate) const MAX_EVAL: i32 = 20000;

/// Tunable evaluation weights. Each pair is `(middlegame, endgame)`.
#[derive(Clone, Debug)]
pub struct EvalParams {
    pub material_mg: [i32; 6],
    pub material_eg: [i32; 6],
    /// Bonus when a side's bishops cover both color complexes.
    pub bishop_pair: (i32, i32),
    /// Penalty per pawn blocked by a non-pawn directly in front.
    pub stopped_pawn: (i32, i32),
    /// Penalty per pawn standing directly behind another own pawn.
    pub blocked_pawn: (i32, i32),
    pub passed_pawn: (i32, i32),
    pub isolated_pawn: (i32, i32),
    pub backward_pawn: (i32, i32),
    /// Bonus per own pawn in the shield zone of a castled king.
    pub pawn_shield: (i32, i32),
    /// Per-square mobility weights for P, N, B, R, Q.
    pub mobility: [(i32, i32); 5],
    /// Bonus per friendly piece defended by another piece, by victim kind P..Q.
    pub piece_defense: [(i32, i32); 5],
    /// Bonus per friendly piece defended by a pawn, by victim kind P..Q.
    pub pawn_defense: [(i32, i32); 5],
    /// Per point of Chebyshev distance to the own king, for N, B, R, Q.
    pub own_king_tropism: [(i32, i32); 4],
    /// Per point of Chebyshev distance to the enemy king, for N, B, R, Q.
    pub enemy_king_tropism: [(i32, i32); 4],
    /// Per point of Manhattan distance from a pawn to its own king.
    pub pawn_tropism: (i32, i32),
    pub weak_pawn_tropism: (i32, i32),
    pub passed_pawn_tropism: (i32, i32),
    /// Penalty per enemy piece whose moves reach the own king zone.
    pub king_zone_attacker: (i32, i32),
    /// Penalty per distinct king-zone square the enemy attacks.
    pub king_zone_coverage: (i32, i32),
    /// Side-to-move bonus, applied after the blend.
    pub tempo: i32,
    /// Mop-up weight per point of the weak king's center distance in
    /// KQK / KRK endings.
    pub mopup_center: i32,
}

impl Default for EvalParams {
    fn default() -> Self {
        EvalParams {
            material_mg: [100, 325, 325, 500, 900, 0],
            material_eg: [130, 310, 340, 530, 950, 0],
            bishop_pair: (35, 45),
            stopped_pawn: (-8, -12),
            blocked_pawn: (-12, -18),
            passed_pawn: (15, 45),
            isolated_pawn: (-12, -16),
            backward_pawn: (-10, -14),
            pawn_shield: (12, 2),
            mobility: [(2, 3), (4, 4), (4, 5), (2, 4), (1, 3)],
            piece_defense: [(2, 2), (3, 3), (3, 3), (2, 2), (1, 1)],
            pawn_defense: [(4, 4), (5, 4), (5, 4), (3, 2), (2, 2)],
            own_king_tropism: [(0, 0), (0, 0), (-1, 0), (-1, 0)],
            enemy_king_tropism: [(-2, -1), (-1, -1), (-2, -1), (-3, -2)],
            pawn_tropism: (0, -1),
            weak_pawn_tropism: (0, -2),
            passed_pawn_tropism: (0, -3),
            king_zone_attacker: (-8, -2),
            king_zone_coverage: (-3, -1),
            tempo: 10,
            mopup_center: 10,
        }
    }
}

/// Accumulated middlegame/endgame score pair.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TaperedScore {
    pub(crate) mg: i32,
    pub(crate) eg: i32,
}

impl TaperedScore {
    /// Add a weight pair `count` times.
    #[inline]
    pub(crate) fn add(&mut self, weight: (i32, i32), count: i32) {
        self.mg += weight.0 * count;
        self.eg += weight.1 * count;
    }
}

impl std::ops::AddAssign for TaperedScore {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.mg += other.mg;
        self.eg += other.eg;
    }
}

impl Board {
    /// Phase score in [0, 256]: 0 at full material (pure middlegame weight),
    /// 256 with all heavy pieces traded (pure endgame weight).
    #[must_use]
    pub fn phase_score(&self) -> i32 {
        let mut remaining = 0;
        for piece in Piece::ALL {
            remaining += self.all_pieces_of_kind(piece).popcount() as i32
                * PHASE_WEIGHTS[piece.index()];
        }

        let p = ((PHASE_TOTAL - remaining) * 256 + PHASE_TOTAL / 2) / PHASE_TOTAL;
        p.clamp(0, 256)
    }

    /// Blend a middlegame/endgame pair by phase score `p`.
    #[inline]
    pub(crate) fn taper(mg: i32, eg: i32, p: i32) -> i32 {
        (mg * (256 - p) + eg * p) / 256
    }

    /// Static evaluation in centipawns, positive meaning good for the side to
    /// move. The caller is expected to only evaluate quiet (not-in-check)
    /// positions.
    #[must_use]
    pub fn evaluate(&self, params: &EvalParams) -> i16 {
        let p = self.phase_score();
        let ctx = AttackContext::build(self);

        let mut scores = [TaperedScore::default(), TaperedScore::default()];
        for color in Color::BOTH {
            let side = &mut scores[color.index()];
            self.material_and_pst(color, params, side);
            self.bishop_pair_term(color, params, side);
            self.pawn_structure(color, params, side);
            self.pawn_shield_term(color, params, side);
            self.activity_terms(color, &ctx, params, side);
            self.tropism_terms(color, params, side);
        }
        self.mopup_term(params, &mut scores);

        let mg = scores[0].mg - scores[1].mg;
        let eg = scores[0].eg - scores[1].eg;
        let mut score = Self::taper(mg, eg, p);

        if !self.white_to_move {
            score = -score;
        }

        // Untapered one-ply bias: tempo, plus the most valuable piece the side
        // to move could capture right now
        score += params.tempo;
        if let Some(victim) = ctx.best_victim(self) {
            score += Self::taper(
                params.material_mg[victim.index()],
                params.material_eg[victim.index()],
                p,
            );
        }

        score.clamp(-MAX_EVAL, MAX_EVAL) as i16
    }

    fn material_and_pst(&self, color: Color, params: &EvalParams, side: &mut TaperedScore) {
        let is_white = color.is_white();
        for piece in Piece::ALL {
            let idx = piece.index();
            for sq in self.pieces_of(color, piece).iter() {
                let pst_sq = pst_index(sq.index(), is_white);
                side.mg += params.material_mg[idx] + PST_MG[idx][pst_sq];
                side.eg += params.material_eg[idx] + PST_EG[idx][pst_sq];
            }
        }
    }

    pub(crate) fn bishop_pair_term(
        &self,
        color: Color,
        params: &EvalParams,
        side: &mut TaperedScore,
    ) {
        let bishops = self.pieces_of(color, Piece::Bishop);
        let on_light = bishops.intersects(Bitboard::LIGHT_SQUARES);
        let on_dark = bishops.intersects(Bitboard::DARK_SQUARES);
        if on_light && on_dark {
            side.add(params.bishop_pair, 1);
        }
    }

    /// Mop-up for KQK / KRK: drive the bare king away from the center.
    fn mopup_term(&self, params: &EvalParams, scores: &mut [TaperedScore; 2]) {
        for color in Color::BOTH {
            let enemy = color.opponent();
            let strong_extras = self.occupied_by(color).popcount();
            let weak_total = self.occupied_by(enemy).popcount();
            if weak_total != 1 || strong_extras != 2 {
                continue;
            }
            let majors = self.pieces_of(color, Piece::Queen).popcount()
                + self.pieces_of(color, Piece::Rook).popcount();
            if majors != 1 {
                continue;
            }
            let weak_king = self.king_square(enemy);
            let bonus = params.mopup_center * weak_king.center_distance();
            scores[color.index()].add((bonus, bonus), 1);
        }
    }
}
