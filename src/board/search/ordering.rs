//! Move ordering.
//!
//! Interior nodes search: hash move, winning/equal tactical moves by MVV/LVA,
//! killers, losing captures by SEE, then quiet moves by relative history.
//! The bands are encoded as disjoint score ranges in one scored list.

use once_cell::sync::Lazy;

use crate::board::see::SEE_VALUES;
use crate::board::types::{Move, MoveKind, MoveList, ScoredMoveList};
use crate::board::{Board, Piece};

use super::tables::{KillerTable, RelativeHistory};

/// Ordering bands. Quiet history scores are clamped below the losing-capture
/// band, which in turn stays below the killers.
const HASH_SCORE: i32 = 1 << 20;
const WINNING_TACTICAL_BASE: i32 = 1 << 16;
const KILLER_1_SCORE: i32 = 30_000;
const KILLER_2_SCORE: i32 = 29_000;
const LOSING_CAPTURE_BASE: i32 = 9_000;
const QUIET_HISTORY_CLAMP: i32 = 6_000;

/// Most-valuable-victim / least-valuable-attacker byte table, indexed by
/// `[attacker][victim]`. Derived from the material ranking so any victim
/// outranks any attacker preference.
static MVV_LVA: Lazy<[[u8; 6]; 6]> = Lazy::new(|| {
    let mut table = [[0u8; 6]; 6];
    for attacker in 0..6 {
        for victim in 0..5 {
            table[attacker][victim] = ((victim as u8) + 1) * 8 + (5 - attacker as u8);
        }
    }
    table
});

/// Bonus for queening, folded into the tactical score. Computed from the
/// material values as pawn-value squared over the king value.
static QUEEN_PROMO_BONUS: Lazy<i32> = Lazy::new(|| {
    SEE_VALUES[Piece::Pawn.index()] * SEE_VALUES[Piece::Pawn.index()]
        / SEE_VALUES[Piece::King.index()]
});

/// MVV/LVA score of a move; zero for non-captures.
#[inline]
pub(crate) fn mvv_lva(m: Move) -> i32 {
    let mut score = match m.captured() {
        Some(victim) => i32::from(MVV_LVA[m.piece().index()][victim.index()]),
        None => 0,
    };
    if m.kind() == MoveKind::PromoteQueen {
        // Queening ranks with winning a queen by pawn
        score += i32::from(MVV_LVA[Piece::Pawn.index()][Piece::Queen.index()]) + *QUEEN_PROMO_BONUS;
    }
    score
}

/// Score a legal move list for interior-node ordering.
pub(crate) fn order_moves(
    board: &Board,
    moves: &MoveList,
    hash_move: Move,
    ply: usize,
    killers: &KillerTable,
    history: &RelativeHistory,
) -> ScoredMoveList {
    let stm = board.side_to_move();
    let killer_pair = killers.get(ply);
    let mut scored = ScoredMoveList::new();

    for m in moves {
        let m = *m;
        let score = if m == hash_move {
            HASH_SCORE
        } else if m.is_tactical() {
            let see = board.see(m);
            if see >= 0 {
                WINNING_TACTICAL_BASE + mvv_lva(m)
            } else {
                LOSING_CAPTURE_BASE + see
            }
        } else if m == killer_pair[0] {
            KILLER_1_SCORE
        } else if m == killer_pair[1] {
            KILLER_2_SCORE
        } else {
            history
                .score(stm, m)
                .clamp(-QUIET_HISTORY_CLAMP, QUIET_HISTORY_CLAMP)
        };
        scored.push(m, score);
    }

    scored
}

/// Score tactical moves for quiescence: MVV/LVA only.
pub(crate) fn order_tactical(moves: &MoveList) -> ScoredMoveList {
    let mut scored = ScoredMoveList::new();
    for m in moves {
        scored.push(*m, mvv_lva(*m));
    }
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    #[test]
    fn test_mvv_lva_prefers_valuable_victims_and_cheap_attackers() {
        let pawn_takes_queen = Move::normal(
            Square::new(3, 3),
            Square::new(4, 4),
            Piece::Pawn,
            Some(Piece::Queen),
        );
        let queen_takes_queen = Move::normal(
            Square::new(3, 3),
            Square::new(4, 4),
            Piece::Queen,
            Some(Piece::Queen),
        );
        let pawn_takes_pawn = Move::normal(
            Square::new(3, 3),
            Square::new(4, 4),
            Piece::Pawn,
            Some(Piece::Pawn),
        );
        assert!(mvv_lva(pawn_takes_queen) > mvv_lva(queen_takes_queen));
        assert!(mvv_lva(queen_takes_queen) > mvv_lva(pawn_takes_pawn));
        assert_eq!(
            mvv_lva(Move::normal(Square::new(0, 0), Square::new(1, 0), Piece::Rook, None)),
            0
        );
    }

    #[test]
    fn test_ordering_bands() {
        // Hash move first, then winning capture, then killer, then quiet
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        );
        let moves = board.generate_moves();
        let hash_move = board.parse_move("e2a6").unwrap(); // bishop takes bishop
        let killer = board.parse_move("a2a3").unwrap();

        let mut killers = KillerTable::new();
        killers.add(0, killer);
        let history = RelativeHistory::new();

        let mut scored = order_moves(&board, &moves, hash_move, 0, &killers, &history);
        scored.sort_by_score_desc();

        assert_eq!(scored.as_slice()[0].mv, hash_move);
        // The top non-hash entries are tactical or the killer, never plain quiets
        let second = scored.as_slice()[1];
        assert!(second.mv.is_tactical() || second.mv == killer);
        // Killer ranks above every unscored quiet move
        let killer_pos = scored.iter().position(|s| s.mv == killer).unwrap();
        for s in &scored.as_slice()[killer_pos + 1..] {
            assert!(s.score < KILLER_1_SCORE);
        }
    }

    #[test]
    fn test_losing_captures_rank_between_killers_and_quiets() {
        // Queen takes a defended pawn: SEE well below zero
        let board: Board = "4k3/8/2p5/3p4/4Q3/8/8/4K3 w - -".parse().unwrap();
        let moves = board.generate_moves();
        let losing = board.parse_move("e4d5").unwrap();
        let killers = KillerTable::new();
        let history = RelativeHistory::new();
        let scored = order_moves(&board, &moves, Move::null(), 0, &killers, &history);
        let entry = scored.iter().find(|s| s.mv == losing).unwrap();
        assert!(entry.score < KILLER_2_SCORE);
        assert!(entry.score > QUIET_HISTORY_CLAMP);
    }
}
