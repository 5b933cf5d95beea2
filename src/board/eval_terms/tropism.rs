//! King tropism: piece distances to both kings, pawn distances to the own king.

use crate::board::eval::{EvalParams, TaperedScore};
use crate::board::types::{Color, Piece};
use crate::board::Board;

impl Board {
    pub(crate) fn tropism_terms(
        &self,
        color: Color,
        params: &EvalParams,
        side: &mut TaperedScore,
    ) {
        let own_king = self.king_square(color);
        let enemy_king = self.king_square(color.opponent());

        for (i, piece) in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
            .into_iter()
            .enumerate()
        {
            for sq in self.pieces_of(color, piece).iter() {
                side.add(params.own_king_tropism[i], sq.chebyshev_distance(own_king));
                side.add(
                    params.enemy_king_tropism[i],
                    sq.chebyshev_distance(enemy_king),
                );
            }
        }

        // Pawns use Manhattan distance, weighted by pawn class
        let (passed, weak) = self.pawn_classes(color);
        for sq in self.pieces_of(color, Piece::Pawn).iter() {
            let weight = if passed.contains(sq) {
                params.passed_pawn_tropism
            } else if weak.contains(sq) {
                params.weak_pawn_tropism
            } else {
                params.pawn_tropism
            };
            side.add(weight, sq.manhattan_distance(own_king));
        }
    }
}
