//! Mobility, piece defense, and king-zone pressure.
//!
//! All of these share the per-piece attack sets, which are computed once per
//! evaluation into an `AttackContext`. The context also remembers enough to
//! derive the side-to-move's most valuable immediate capture for the one-ply
//! evaluation bias.

use crate::board::attack_tables::{
    bishop_attacks, queen_attacks, rook_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS,
};
use crate::board::eval::{EvalParams, TaperedScore};
use crate::board::types::{bit_for_square, Bitboard, Color, Piece};
use crate::board::Board;

use super::pawns::pawn_attack_set;

/// Attack sets and derived counters for one evaluation pass.
pub(crate) struct AttackContext {
    /// Union of all attack squares per color, own-occupied squares included.
    pub(crate) all_attacks: [u64; 2],
    /// Union of pawn attack squares per color.
    pub(crate) pawn_attacks: [u64; 2],
    /// Union of non-pawn attack squares per color.
    pub(crate) nonpawn_attacks: [u64; 2],
    /// Mobility square counts per color for P, N, B, R, Q.
    pub(crate) mobility: [[i32; 5]; 2],
    /// Number of enemy pieces whose moves reach this color's king zone.
    pub(crate) zone_attackers: [i32; 2],
    /// Union of this color's king-zone squares the enemy attacks.
    pub(crate) zone_coverage: [u64; 2],
}

/// King zone: the king's field extended two ranks toward the enemy.
fn king_zone(board: &Board, color: Color) -> u64 {
    let king = board.king_square(color);
    let block = KING_ATTACKS[king.index()] | bit_for_square(king).0;
    block | Bitboard(block).shift_forward(color.is_white()).0
}

impl AttackContext {
    pub(crate) fn build(board: &Board) -> Self {
        let mut ctx = AttackContext {
            all_attacks: [0; 2],
            pawn_attacks: [0; 2],
            nonpawn_attacks: [0; 2],
            mobility: [[0; 5]; 2],
            zone_attackers: [0; 2],
            zone_coverage: [0; 2],
        };

        let zones = [king_zone(board, Color::White), king_zone(board, Color::Black)];
        let occ = board.all_occupied.0;

        for color in Color::BOTH {
            let c = color.index();
            let enemy = color.opponent().index();
            let own = board.occupied_by(color).0;

            for piece in Piece::ALL {
                for sq in board.pieces_of(color, piece).iter() {
                    let idx = sq.index();
                    let attacks = match piece {
                        Piece::Pawn => PAWN_ATTACKS[c][idx],
                        Piece::Knight => KNIGHT_ATTACKS[idx],
                        Piece::Bishop => bishop_attacks(idx, occ),
                        Piece::Rook => rook_attacks(idx, occ),
                        Piece::Queen => queen_attacks(idx, occ),
                        Piece::King => KING_ATTACKS[idx],
                    };

                    ctx.all_attacks[c] |= attacks;
                    if piece == Piece::Pawn {
                        ctx.pawn_attacks[c] |= attacks;
                    } else {
                        ctx.nonpawn_attacks[c] |= attacks;
                    }

                    if !matches!(piece, Piece::Pawn | Piece::King) {
                        ctx.mobility[c][piece.index()] +=
                            (attacks & !own).count_ones() as i32;
                    }

                    if attacks & zones[enemy] != 0 {
                        ctx.zone_attackers[enemy] += 1;
                        ctx.zone_coverage[enemy] |= attacks & zones[enemy];
                    }
                }
            }

            // Pawn mobility counts actual pawn moves: pushes and captures
            let pawns = board.pieces_of(color, Piece::Pawn);
            let empty = !occ;
            let their = board.occupied_by(color.opponent()).0;
            let singles = pawns.shift_forward(color.is_white()).0 & empty;
            let double_rank = if color.is_white() {
                Bitboard::RANK_4.0
            } else {
                Bitboard::RANK_5.0
            };
            let doubles =
                Bitboard(singles).shift_forward(color.is_white()).0 & empty & double_rank;
            let captures = pawn_attack_set(pawns, color.is_white()).0 & their;
            ctx.mobility[c][0] = (singles.count_ones()
                + doubles.count_ones()
                + captures.count_ones()) as i32;
        }

        ctx
    }

    /// Most valuable enemy piece the side to move attacks, if any.
    pub(crate) fn best_victim(&self, board: &Board) -> Option<Piece> {
        let stm = board.side_to_move();
        let enemy = stm.opponent();
        let attacks = self.all_attacks[stm.index()];
        for victim in [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight, Piece::Pawn] {
            if attacks & board.pieces_of(enemy, victim).0 != 0 {
                return Some(victim);
            }
        }
        None
    }
}

impl Board {
    pub(crate) fn activity_terms(
        &self,
        color: Color,
        ctx: &AttackContext,
        params: &EvalParams,
        side: &mut TaperedScore,
    ) {
        let c = color.index();

        for kind in 0..5 {
            side.add(params.mobility[kind], ctx.mobility[c][kind]);
        }

        // Defended friendly pieces, split by defender class
        for victim in [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            let own_of_kind = self.pieces_of(color, victim).0;
            let by_piece = (own_of_kind & ctx.nonpawn_attacks[c]).count_ones() as i32;
            let by_pawn = (own_of_kind & ctx.pawn_attacks[c]).count_ones() as i32;
            side.add(params.piece_defense[victim.index()], by_piece);
            side.add(params.pawn_defense[victim.index()], by_pawn);
        }

        // Pressure against the own king zone
        side.add(params.king_zone_attacker, ctx.zone_attackers[c]);
        side.add(
            params.king_zone_coverage,
            ctx.zone_coverage[c].count_ones() as i32,
        );
    }
}
