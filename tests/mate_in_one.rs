//! Mate-in-one regression suite.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use basalt::{smp_search, Board, ScoreType, SearchLimits, SearchState};

fn best_move(fen: &str) -> (String, Option<ScoreType>, Option<i16>) {
    let board: Board = fen.parse().expect("valid FEN");
    let mut state = SearchState::new(16);
    let result = smp_search(
        &board,
        &mut state,
        &SearchLimits::depth(3),
        Arc::new(AtomicBool::new(false)),
        None,
    );
    (
        result.best_move.expect("mate position has a move"),
        result.score_type,
        result.score,
    )
}

#[test]
fn back_rank_mate() {
    let (mv, ty, score) = best_move("6k1/5ppp/8/8/8/8/5PPP/4R1K1 w - - 0 1");
    assert_eq!(mv, "e1e8");
    assert_eq!(ty, Some(ScoreType::Mate));
    assert_eq!(score, Some(1));
}

#[test]
fn queen_corner_mate() {
    let (mv, ty, _) = best_move("7k/8/5K2/8/8/8/8/6Q1 w - - 0 1");
    // Qg7 is the only mate in one
    assert_eq!(mv, "g1g7");
    assert_eq!(ty, Some(ScoreType::Mate));
}

#[test]
fn smothered_corner_mate() {
    let (mv, ty, _) = best_move("6rk/6pp/7N/8/8/8/8/K7 w - - 0 1");
    // Nf7 is mate: the king is boxed in by its own pieces
    assert_eq!(mv, "h6f7");
    assert_eq!(ty, Some(ScoreType::Mate));
}

#[test]
fn promotion_mate() {
    let fen = "7k/5KP1/8/8/8/8/8/8 w - - 0 1";
    let (mv, ty, _) = best_move(fen);
    let mut probe: Board = fen.parse().unwrap();
    probe.make_move_pacn(&mv).unwrap();
    assert!(probe.is_checkmate(), "{mv} is not mate");
    assert_eq!(ty, Some(ScoreType::Mate));
}
