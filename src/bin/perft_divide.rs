//! Perft divide: per-root-move node counts for debugging the generator.
//!
//! Usage: perft_divide <depth> [fen]

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use basalt::Board;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: perft_divide <depth> [fen]");
        return ExitCode::FAILURE;
    }

    let depth: usize = match args[0].parse() {
        Ok(d) => d,
        Err(_) => {
            eprintln!("invalid depth '{}'", args[0]);
            return ExitCode::FAILURE;
        }
    };

    let mut board = if args.len() > 1 {
        let fen = args[1..].join(" ");
        match Board::try_from_fen(&fen) {
            Ok(board) => board,
            Err(err) => {
                eprintln!("invalid FEN: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Board::new()
    };

    let start = Instant::now();
    let divide = board.perft_divide(depth);
    let total: u64 = divide.iter().map(|(_, nodes)| nodes).sum();

    for (mv, nodes) in &divide {
        println!("{mv}: {nodes}");
    }
    println!();
    println!(
        "perft({depth}) = {total} in {:.3}s",
        start.elapsed().as_secs_f64()
    );
    ExitCode::SUCCESS
}
