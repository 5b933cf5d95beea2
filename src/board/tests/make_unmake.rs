//! Make/unmake round-trip tests.

use rand::prelude::*;

use crate::board::{Board, Color, Move, Piece, Square};

fn find_move(board: &Board, from: Square, to: Square, promotion: Option<Piece>) -> Move {
    for m in board.generate_moves().iter() {
        if m.from() == from && m.to() == to && m.promotion() == promotion {
            return *m;
        }
    }
    panic!("expected move not found");
}

/// Everything `unmake_move` must restore, captured before a move.
fn snapshot(board: &Board) -> (u64, String, u8, Option<Square>, u32) {
    (
        board.key(),
        board.to_fen(),
        board.fifty_move_clock(),
        board.en_passant_target,
        board.ply(),
    )
}

fn assert_restored(board: &Board, snap: &(u64, String, u8, Option<Square>, u32)) {
    assert_eq!(board.key(), snap.0);
    assert_eq!(board.to_fen(), snap.1);
    assert_eq!(board.fifty_move_clock(), snap.2);
    assert_eq!(board.en_passant_target, snap.3);
    assert_eq!(board.ply(), snap.4);
}

#[test]
fn test_simple_move_round_trip() {
    let mut board = Board::new();
    let snap = snapshot(&board);
    let mv = find_move(&board, Square::new(1, 4), Square::new(3, 4), None);
    board.make_move(mv);
    assert_ne!(board.key(), snap.0);
    assert_eq!(board.unmake_move(), Some(mv));
    assert_restored(&board, &snap);
}

#[test]
fn test_en_passant_round_trip() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let snap = snapshot(&board);
    let mv = find_move(&board, Square::new(4, 4), Square::new(5, 5), None);
    assert!(mv.is_en_passant());
    board.make_move(mv);
    // The captured pawn disappears from f5
    assert_eq!(board.piece_at(Square::new(4, 5)), None);
    board.unmake_move();
    assert_restored(&board, &snap);
    assert_eq!(
        board.piece_at(Square::new(4, 5)),
        Some((Color::Black, Piece::Pawn))
    );
}

#[test]
fn test_promotion_round_trip() {
    let mut board = Board::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1");
    let snap = snapshot(&board);
    let mv = find_move(
        &board,
        Square::new(6, 0),
        Square::new(7, 0),
        Some(Piece::Queen),
    );
    board.make_move(mv);
    assert_eq!(
        board.piece_at(Square::new(7, 0)),
        Some((Color::White, Piece::Queen))
    );
    board.unmake_move();
    assert_restored(&board, &snap);
    assert_eq!(
        board.piece_at(Square::new(6, 0)),
        Some((Color::White, Piece::Pawn))
    );
}

#[test]
fn test_castling_round_trip_both_sides() {
    for (fen, king_to, rook_from, rook_to) in [
        (
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            Square::new(0, 6),
            Square::new(0, 7),
            Square::new(0, 5),
        ),
        (
            "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1",
            Square::new(0, 2),
            Square::new(0, 0),
            Square::new(0, 3),
        ),
    ] {
        let mut board = Board::from_fen(fen);
        let snap = snapshot(&board);
        let mv = find_move(&board, Square::new(0, 4), king_to, None);
        assert!(mv.is_castling());
        board.make_move(mv);
        assert_eq!(
            board.piece_at(rook_to),
            Some((Color::White, Piece::Rook)),
            "rook did not move for {mv}"
        );
        assert_eq!(board.piece_at(rook_from), None);
        board.unmake_move();
        assert_restored(&board, &snap);
    }
}

#[test]
fn test_null_move_round_trip() {
    let mut board =
        Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
    let snap = snapshot(&board);
    let side = board.white_to_move();

    board.make_null_move();
    assert_eq!(board.en_passant_target, None);
    assert_ne!(board.key(), snap.0);
    assert_ne!(board.white_to_move(), side);

    board.unmake_move();
    assert_restored(&board, &snap);
    assert_eq!(board.white_to_move(), side);
}

#[test]
fn test_castling_rights_follow_rook_capture() {
    // Capturing the h8 rook removes black's short castling right
    let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let mv = find_move(&board, Square::new(0, 7), Square::new(7, 7), None);
    board.make_move(mv);
    assert!(!board.has_castling_right(Color::Black, 'K'));
    assert!(board.has_castling_right(Color::Black, 'Q'));
    // And white's own short right went with the h1 rook
    assert!(!board.has_castling_right(Color::White, 'K'));
    board.unmake_move();
    assert!(board.has_castling_right(Color::Black, 'K'));
    assert!(board.has_castling_right(Color::White, 'K'));
}

#[test]
fn test_key_matches_recompute_after_random_moves() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);

    for _ in 0..60 {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.make_move(mv);
        assert_eq!(board.key(), board.calculate_key_from_scratch());
    }

    while board.unmake_move().is_some() {
        assert_eq!(board.key(), board.calculate_key_from_scratch());
    }
}

#[test]
fn test_random_playout_full_round_trip() {
    let mut board = Board::new();
    let snap = snapshot(&board);
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut played = 0;

    for _ in 0..200 {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.make_move(mv);
        played += 1;
    }

    for _ in 0..played {
        assert!(board.unmake_move().is_some());
    }
    assert_restored(&board, &snap);
    assert!(board.unmake_move().is_none());
}

#[test]
fn test_checkers_maintained_incrementally() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..80 {
        let moves = board.generate_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        board.make_move(mv);
        assert_eq!(board.checkers(), board.compute_checkers());
        assert_eq!(board.in_check(), !board.compute_checkers().is_empty());
    }
}
