//! Evaluation tests: symmetry and basic sanity.

use crate::board::{Board, Color, EvalParams, Piece, Square};

/// Mirror a position vertically and swap the colors (including side to move,
/// castling rights, and the en passant target).
fn mirror(board: &Board) -> Board {
    let mut placement = vec![String::new(); 8];
    for (rank, row) in placement.iter_mut().enumerate() {
        let mut empty = 0;
        for file in 0..8 {
            // Visual rank `rank` from the top of the new FEN is board rank
            // 7-rank; we read the source from the mirrored square
            let src = Square::new(rank, file);
            match board.piece_at(src) {
                Some((color, piece)) => {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color.opponent()));
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            row.push_str(&empty.to_string());
        }
    }

    let stm = if board.white_to_move() { "b" } else { "w" };

    let mut castling = String::new();
    if board.has_castling_right(Color::Black, 'K') {
        castling.push('K');
    }
    if board.has_castling_right(Color::Black, 'Q') {
        castling.push('Q');
    }
    if board.has_castling_right(Color::White, 'K') {
        castling.push('k');
    }
    if board.has_castling_right(Color::White, 'Q') {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = board
        .en_passant_target
        .map_or("-".to_string(), |sq| sq.flip_vertical().to_string());

    let fen = format!("{} {} {} {}", placement.join("/"), stm, castling, ep);
    Board::from_fen(&fen)
}

const QUIET_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq - 4 4",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "8/5k2/8/8/3B4/8/1K6/8 b - - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1",
];

#[test]
fn test_evaluation_mirror_symmetry() {
    let params = EvalParams::default();
    for fen in QUIET_FENS {
        let board = Board::from_fen(fen);
        let mirrored = mirror(&board);
        // The mirror swaps sides, so the side-to-move score is identical
        // including the tempo and immediate-capture terms
        assert_eq!(
            board.evaluate(&params),
            mirrored.evaluate(&params),
            "mirror asymmetry for {fen}"
        );
    }
}

#[test]
fn test_startpos_score_is_exactly_tempo() {
    let params = EvalParams::default();
    let board = Board::new();
    assert_eq!(board.evaluate(&params), params.tempo as i16);
    // And from black's point of view after a null-ish symmetric FEN flip
    let black_view =
        Board::from_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1");
    assert_eq!(black_view.evaluate(&params), params.tempo as i16);
}

#[test]
fn test_extra_material_dominates() {
    let params = EvalParams::default();
    let up_a_rook: Board = "4k3/8/8/8/8/8/8/R3K3 w - -".parse().unwrap();
    assert!(up_a_rook.evaluate(&params) > 300);
    let down_a_rook: Board = "4k3/8/8/8/8/8/8/R3K3 b - -".parse().unwrap();
    assert!(down_a_rook.evaluate(&params) < -300);
}

#[test]
fn test_passed_pawn_is_rewarded() {
    let params = EvalParams::default();
    // Identical except the black d7 pawn moved to f7, clearing e5's path
    let blocked: Board = "4k3/3p4/8/4P3/8/8/8/4K3 w - -".parse().unwrap();
    let passed: Board = "4k3/5p2/8/4P3/8/8/8/4K3 w - -".parse().unwrap();
    assert!(passed.evaluate(&params) > blocked.evaluate(&params));
}

#[test]
fn test_eval_stays_within_bounds() {
    let params = EvalParams::default();
    // A grotesque material imbalance still stays below the mate range
    let board: Board = "4k3/8/8/8/8/8/QQQQQQQQ/QQQQK2Q w - -".parse().unwrap();
    let score = i32::from(board.evaluate(&params));
    assert!(score <= 20000);
    assert!(score > 2000);
}

#[test]
fn test_phase_tracks_material() {
    let start = Board::new();
    assert_eq!(start.phase_score(), 0);
    let queenless: Board =
        "rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq -".parse().unwrap();
    assert!(queenless.phase_score() > 0);
    let krk: Board = "4k3/8/8/8/8/8/8/R3K3 w - -".parse().unwrap();
    assert!(krk.phase_score() > queenless.phase_score());
    assert!(krk.phase_score() < 256);
    let bare: Board = "4k3/8/8/8/8/8/8/4K3 w - -".parse().unwrap();
    assert_eq!(bare.phase_score(), 256);
}

#[test]
fn test_see_values_match_reference_examples() {
    // The worked examples from the exchange-evaluation contract
    let board: Board = "4k3/8/8/4n3/3P4/8/8/4K3 w - -".parse().unwrap();
    let mv = board.parse_move("d4e5").unwrap();
    assert_eq!(board.see(mv), 325);

    let board: Board = "4k3/8/3p4/4n3/3P4/8/8/4K3 w - -".parse().unwrap();
    let mv = board.parse_move("d4e5").unwrap();
    assert_eq!(board.see(mv), 225);

    // After 1...d5 the d-file opens and the queen recaptures pawn for pawn
    let mut board: Board = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq -"
        .parse()
        .unwrap();
    board.make_move_pacn("d7d5").unwrap();
    let mv = board.parse_move("e4d5").unwrap();
    assert_eq!(board.see(mv), 0);
}

#[test]
fn test_mirror_helper_is_an_involution() {
    for fen in QUIET_FENS {
        let board = Board::from_fen(fen);
        let twice = mirror(&mirror(&board));
        assert_eq!(board.key(), twice.key(), "double mirror changed {fen}");
    }
}

#[test]
fn test_bishop_pair_needs_both_complexes() {
    use crate::board::eval::TaperedScore;

    let params = EvalParams::default();
    // Both bishops on dark squares: no pair bonus
    let same: Board = "4k3/8/8/8/8/2B1B3/8/4K3 w - -".parse().unwrap();
    let mut score = TaperedScore::default();
    same.bishop_pair_term(Color::White, &params, &mut score);
    assert_eq!(score.mg, 0);

    // One bishop per complex earns the bonus
    let pair: Board = "4k3/8/8/8/8/2B5/4B3/4K3 w - -".parse().unwrap();
    assert_eq!(
        pair.pieces_of(Color::White, Piece::Bishop).popcount(),
        same.pieces_of(Color::White, Piece::Bishop).popcount()
    );
    let mut score = TaperedScore::default();
    pair.bishop_pair_term(Color::White, &params, &mut score);
    assert_eq!(score.mg, params.bishop_pair.0);
    assert_eq!(score.eg, params.bishop_pair.1);
}
