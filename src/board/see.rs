//! Static Exchange Evaluation (SEE).
//!
//! Plays out the capture sequence on a single square, each side always
//! recapturing with its least valuable attacker, and negamaxes the material
//! gains back. X-ray attackers are discovered by re-evaluating slider attacks
//! over the shrinking occupancy.

use super::attack_tables::{bishop_attacks, rook_attacks};
use super::types::{bit_for_square, Bitboard, Color, Move, Piece, Square};
use super::Board;

/// Piece values for exchange evaluation. The king's symbolic value keeps
/// king captures dominant in the swap-off without ever being cashed in.
pub(crate) const SEE_VALUES: [i32; 6] = [
    100,   // Pawn
    325,   // Knight
    325,   // Bishop
    500,   // Rook
    900,   // Queen
    20000, // King
];

impl Board {
    /// Static exchange evaluation of a move, in centipawns from the side to
    /// move's perspective. Positive means the capture sequence wins material.
    #[must_use]
    pub fn see(&self, m: Move) -> i32 {
        const MAX_EXCHANGES: usize = 32;

        let to = m.to();
        let to_idx = to.index();
        let mut gain = [0i32; MAX_EXCHANGES];
        let mut depth = 0;

        // Initial capture value, with the promotion delta folded in
        gain[0] = m.captured().map_or(0, |p| SEE_VALUES[p.index()]);
        let mut last_attacker_value = if let Some(promo) = m.promotion() {
            gain[0] += SEE_VALUES[promo.index()] - SEE_VALUES[Piece::Pawn.index()];
            SEE_VALUES[promo.index()]
        } else {
            SEE_VALUES[m.piece().index()]
        };

        // Occupancy with the first mover removed; en passant also removes the
        // captured pawn from its own square rather than `to`
        let mut occupancy = self.all_occupied.0 ^ bit_for_square(m.from()).0;
        if m.is_en_passant() {
            occupancy ^= bit_for_square(Square::new(m.from().rank(), to.file())).0;
        }

        let mut attackers = self.attackers_to(to, Bitboard(occupancy)).0 & occupancy;
        let mut side = self.side_to_move().opponent();

        loop {
            let side_attackers = attackers & self.occupied_by(side).0;
            if side_attackers == 0 {
                break;
            }

            let Some((attacker_piece, attacker_bit)) =
                self.least_valuable_attacker(side_attackers, side)
            else {
                break;
            };

            // A king may only recapture when nothing can answer it
            if attacker_piece == Piece::King
                && attackers & self.occupied_by(side.opponent()).0 != 0
            {
                break;
            }

            depth += 1;
            if depth >= MAX_EXCHANGES {
                break;
            }
            gain[depth] = last_attacker_value - gain[depth - 1];

            // Stand-pat pruning: stop when neither continuing nor stopping helps
            if gain[depth].max(-gain[depth - 1]) < 0 {
                break;
            }

            // Remove the attacker and uncover x-rays behind it
            occupancy ^= attacker_bit;
            attackers &= !attacker_bit;
            if attacker_piece == Piece::Pawn || attacker_piece.attacks_diagonal() {
                let diagonal = self.all_pieces_of_kind(Piece::Bishop).0
                    | self.all_pieces_of_kind(Piece::Queen).0;
                attackers |= bishop_attacks(to_idx, occupancy) & diagonal & occupancy;
            }
            if attacker_piece.attacks_straight() || attacker_piece == Piece::Pawn {
                let straight = self.all_pieces_of_kind(Piece::Rook).0
                    | self.all_pieces_of_kind(Piece::Queen).0;
                attackers |= rook_attacks(to_idx, occupancy) & straight & occupancy;
            }

            last_attacker_value = SEE_VALUES[attacker_piece.index()];
            side = side.opponent();
        }

        // Negamax the gains back up
        while depth > 0 {
            depth -= 1;
            gain[depth] = -(-gain[depth]).max(gain[depth + 1]);
        }

        gain[0]
    }

    /// Least valuable attacker from a set, using the pawn -> knight -> bishop
    /// -> rook -> queen -> king cascade.
    fn least_valuable_attacker(
        &self,
        attackers: u64,
        color: Color,
    ) -> Option<(Piece, u64)> {
        for piece in Piece::ALL {
            let candidates = attackers & self.pieces_of(color, piece).0;
            if candidates != 0 {
                return Some((piece, candidates & candidates.wrapping_neg()));
            }
        }
        None
    }

    /// Convenience threshold test used by move ordering.
    #[inline]
    #[must_use]
    pub fn see_ge(&self, m: Move, threshold: i32) -> bool {
        self.see(m) >= threshold
    }
}
