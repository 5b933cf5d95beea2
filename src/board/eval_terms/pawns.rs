//! Pawn structure terms and the king pawn shield.

use crate::board::eval::{EvalParams, TaperedScore};
use crate::board::types::{bit_for_square, Bitboard, Color, Piece};
use crate::board::Board;

/// Squares attacked by a set of pawns of the given color.
#[inline]
pub(crate) fn pawn_attack_set(pawns: Bitboard, is_white: bool) -> Bitboard {
    if is_white {
        Bitboard(((pawns.0 << 7) & !Bitboard::FILE_H.0) | ((pawns.0 << 9) & !Bitboard::FILE_A.0))
    } else {
        Bitboard(((pawns.0 >> 7) & !Bitboard::FILE_A.0) | ((pawns.0 >> 9) & !Bitboard::FILE_H.0))
    }
}

impl Board {
    /// Passed and weak (isolated or backward) pawns of a color.
    pub(crate) fn pawn_classes(&self, color: Color) -> (Bitboard, Bitboard) {
        let is_white = color.is_white();
        let own_pawns = self.pieces_of(color, Piece::Pawn);
        let enemy_pawns = self.pieces_of(color.opponent(), Piece::Pawn);

        let mut passed = Bitboard::EMPTY;
        let mut weak = Bitboard::EMPTY;

        for sq in own_pawns.iter() {
            let bit = bit_for_square(sq);
            let adjacent = Bitboard(bit.shift_east().0 | bit.shift_west().0);

            // Front span over the own and both adjacent files
            let front_span = Bitboard(adjacent.0 | bit.0)
                .shift_forward(is_white)
                .front_fill(is_white);
            if !enemy_pawns.intersects(front_span) {
                passed.0 |= bit.0;
            }

            let file = Bitboard::file_mask(sq.file());
            let adjacent_files =
                Bitboard(file.shift_east().0 | file.shift_west().0);
            let isolated = !own_pawns.intersects(adjacent_files);

            // Backward: the stop square is covered by an enemy pawn and no own
            // pawn on an adjacent file is level with or behind this one
            let support_span = adjacent.front_fill(!is_white);
            let stop = bit.shift_forward(is_white);
            let stop_attacked =
                pawn_attack_set(enemy_pawns, !is_white).intersects(stop);
            let backward = stop_attacked && !own_pawns.intersects(support_span);

            if isolated || backward {
                weak.0 |= bit.0;
            }
        }

        (passed, weak)
    }

    pub(crate) fn pawn_structure(
        &self,
        color: Color,
        params: &EvalParams,
        side: &mut TaperedScore,
    ) {
        let is_white = color.is_white();
        let own_pawns = self.pieces_of(color, Piece::Pawn);
        let enemy_pawns = self.pieces_of(color.opponent(), Piece::Pawn);
        let all_pawns = Bitboard(own_pawns.0 | enemy_pawns.0);

        // Stopped: a non-pawn sits directly in front
        let front = own_pawns.shift_forward(is_white);
        let stopped = front.0 & self.all_occupied.0 & !all_pawns.0;
        side.add(params.stopped_pawn, stopped.count_ones() as i32);

        // Blocked: directly behind another own pawn
        let blocked = front.0 & own_pawns.0;
        side.add(params.blocked_pawn, blocked.count_ones() as i32);

        let (passed, weak) = self.pawn_classes(color);
        side.add(params.passed_pawn, passed.popcount() as i32);

        let mut isolated_count = 0;
        let mut backward_count = 0;
        for sq in own_pawns.iter() {
            let file = Bitboard::file_mask(sq.file());
            let adjacent_files = Bitboard(file.shift_east().0 | file.shift_west().0);
            if !own_pawns.intersects(adjacent_files) {
                isolated_count += 1;
            } else if weak.contains(sq) {
                backward_count += 1;
            }
        }
        side.add(params.isolated_pawn, isolated_count);
        side.add(params.backward_pawn, backward_count);
    }

    /// Count own pawns on the two ranks in front of a castled king.
    pub(crate) fn pawn_shield_term(
        &self,
        color: Color,
        params: &EvalParams,
        side: &mut TaperedScore,
    ) {
        let king = self.king_square(color);
        let file = king.file();
        // Only a king that has left the center gets a shield bonus
        if (3..=4).contains(&file) {
            return;
        }

        let is_white = color.is_white();
        let king_bit = bit_for_square(king);
        let files = Bitboard(king_bit.shift_east().0 | king_bit.shift_west().0 | king_bit.0);
        let rank_1 = files.shift_forward(is_white);
        let rank_2 = rank_1.shift_forward(is_white);
        let zone = Bitboard(rank_1.0 | rank_2.0);

        let shield = zone.0 & self.pieces_of(color, Piece::Pawn).0;
        side.add(params.pawn_shield, shield.count_ones() as i32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Square;

    #[test]
    fn test_pawn_attack_set_directions() {
        let e4 = Bitboard::from_square(Square::new(3, 4));
        let white = pawn_attack_set(e4, true);
        assert!(white.contains(Square::new(4, 3)));
        assert!(white.contains(Square::new(4, 5)));
        assert_eq!(white.popcount(), 2);

        let black = pawn_attack_set(e4, false);
        assert!(black.contains(Square::new(2, 3)));
        assert!(black.contains(Square::new(2, 5)));

        // Edge files must not wrap
        let a2 = Bitboard::from_square(Square::new(1, 0));
        assert_eq!(pawn_attack_set(a2, true).popcount(), 1);
    }

    #[test]
    fn test_passed_pawn_detection() {
        // White pawn e5 is passed (black pawn on a7 is far away)
        let board: Board = "4k3/p7/8/4P3/8/8/8/4K3 w - -".parse().unwrap();
        let (passed, _) = board.pawn_classes(Color::White);
        assert!(passed.contains(Square::new(4, 4)));
        // Black d-pawn in front on an adjacent file stops the pass
        let board: Board = "4k3/3p4/8/4P3/8/8/8/4K3 w - -".parse().unwrap();
        let (passed, _) = board.pawn_classes(Color::White);
        assert!(!passed.contains(Square::new(4, 4)));
    }

    #[test]
    fn test_isolated_pawn_detection() {
        // The a-pawn has no neighbors; e- and f-pawns support each other
        let board: Board = "4k3/8/8/8/8/8/P3PP2/4K3 w - -".parse().unwrap();
        let (_, weak) = board.pawn_classes(Color::White);
        assert!(weak.contains(Square::new(1, 0)));
        assert!(!weak.contains(Square::new(1, 4)));
        assert!(!weak.contains(Square::new(1, 5)));
    }

    #[test]
    fn test_backward_pawn_detection() {
        // White d4 and e3: e3's stop square e4 is attacked by the black pawn
        // on d5, and no white pawn can ever defend e4
        let board: Board = "4k3/8/8/3p4/3P4/4P3/8/4K3 w - -".parse().unwrap();
        let (_, weak) = board.pawn_classes(Color::White);
        assert!(weak.contains(Square::new(2, 4)), "e3 should be backward");
        assert!(!weak.contains(Square::new(3, 3)), "d4 is not backward");
    }

    #[test]
    fn test_pawn_shield_counts() {
        let params = EvalParams::default();
        // Castled king with intact shield
        let board: Board = "4k3/8/8/8/8/8/5PPP/6K1 w - -".parse().unwrap();
        let mut shielded = TaperedScore::default();
        board.pawn_shield_term(Color::White, &params, &mut shielded);
        assert_eq!(shielded.mg, 3 * params.pawn_shield.0);

        // Central king: no shield term at all
        let board: Board = "4k3/8/8/8/8/8/3PPP2/4K3 w - -".parse().unwrap();
        let mut central = TaperedScore::default();
        board.pawn_shield_term(Color::White, &params, &mut central);
        assert_eq!(central.mg, 0);
    }
}
