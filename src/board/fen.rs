//! FEN parsing/emission and PACN move parsing.

use std::str::FromStr;

use super::error::{FenError, MoveParseError};
use super::types::{file_to_index, rank_to_index};
use super::{
    Board, Color, Move, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K,
    CASTLE_WHITE_Q,
};

impl Board {
    /// Parse a position from FEN.
    ///
    /// Accepts both the six-field and the four-field form; the short form
    /// defaults the fifty-move clock to 0 and the full-move number to 1.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let fields: Vec<&str> = fen.split_whitespace().collect();

        if fields.len() < 4 {
            return Err(FenError::TooFewFields {
                found: fields.len(),
            });
        }

        // Piece placement
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::WrongRankCount { found: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let color = if c.is_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank: rank_idx,
                            files: file + 1,
                        });
                    }
                    board.set_piece(Square::new(7 - rank_idx, file), color, piece);
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::TooManyFiles {
                    rank: rank_idx,
                    files: file,
                });
            }
        }

        let white_kings = board.pieces_of(Color::White, Piece::King).popcount();
        let black_kings = board.pieces_of(Color::Black, Piece::King).popcount();
        if white_kings != 1 || black_kings != 1 {
            return Err(FenError::InvalidKingCount {
                white: white_kings,
                black: black_kings,
            });
        }

        // Side to move
        match fields[1] {
            "w" => board.white_to_move = true,
            "b" => board.white_to_move = false,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        }

        // Castling rights
        for c in fields[2].chars() {
            match c {
                'K' => board.castling_rights |= CASTLE_WHITE_K,
                'Q' => board.castling_rights |= CASTLE_WHITE_Q,
                'k' => board.castling_rights |= CASTLE_BLACK_K,
                'q' => board.castling_rights |= CASTLE_BLACK_Q,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }

        // En passant target
        board.en_passant_target = if fields[3] == "-" {
            None
        } else {
            let sq: Square = fields[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: fields[3].to_string(),
            })?;
            if sq.rank() != 2 && sq.rank() != 5 {
                return Err(FenError::InvalidEnPassant {
                    found: fields[3].to_string(),
                });
            }
            Some(sq)
        };

        // Fifty-move clock (optional)
        if fields.len() >= 5 {
            board.fifty_move_clock =
                fields[4].parse().map_err(|_| FenError::InvalidClock {
                    found: fields[4].to_string(),
                })?;
        }

        // Full-move number (optional)
        if fields.len() >= 6 {
            let fullmove: u32 = fields[5].parse().map_err(|_| FenError::InvalidClock {
                found: fields[5].to_string(),
            })?;
            if fullmove == 0 {
                return Err(FenError::InvalidClock {
                    found: fields[5].to_string(),
                });
            }
            board.fullmove_number = fullmove;
        }

        board.finish_setup();
        Ok(board)
    }

    /// Parse a position from FEN, panicking on malformed input.
    ///
    /// # Panics
    /// Panics if the FEN string is invalid. Use `try_from_fen` for fallible parsing.
    #[must_use]
    pub fn from_fen(fen: &str) -> Self {
        Self::try_from_fen(fen).expect("invalid FEN string")
    }

    /// Emit the position as a six-field FEN string.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::new();
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square::new(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = if self.white_to_move { "w" } else { "b" };
        let ep = self
            .en_passant_target
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            self.castling_string(),
            ep,
            self.fifty_move_clock,
            self.fullmove_number
        )
    }

    /// Parse a move in PACN (e.g. "e2e4", "e7e8q"; castling as the king's
    /// two-square move) against the current legal move list.
    pub fn parse_move(&self, pacn: &str) -> Result<Move, MoveParseError> {
        if pacn.len() < 4 || pacn.len() > 5 {
            return Err(MoveParseError::InvalidLength { len: pacn.len() });
        }

        let chars: Vec<char> = pacn.chars().collect();
        if !('a'..='h').contains(&chars[0])
            || !('1'..='8').contains(&chars[1])
            || !('a'..='h').contains(&chars[2])
            || !('1'..='8').contains(&chars[3])
        {
            return Err(MoveParseError::InvalidSquare {
                notation: pacn.to_string(),
            });
        }

        let from = Square::new(rank_to_index(chars[1]), file_to_index(chars[0]));
        let to = Square::new(rank_to_index(chars[3]), file_to_index(chars[2]));

        let promotion = if pacn.len() == 5 {
            let piece = Piece::from_char(chars[4]).ok_or(MoveParseError::InvalidPromotion {
                char: chars[4],
            })?;
            if matches!(piece, Piece::Pawn | Piece::King) {
                return Err(MoveParseError::InvalidPromotion { char: chars[4] });
            }
            Some(piece)
        } else {
            None
        };

        let legal_moves = self.generate_moves();
        for mv in &legal_moves {
            if mv.from() == from && mv.to() == to && mv.promotion() == promotion {
                return Ok(*mv);
            }
        }

        Err(MoveParseError::IllegalMove {
            notation: pacn.to_string(),
        })
    }

    /// Parse a PACN move and make it on the board in one call.
    pub fn make_move_pacn(&mut self, pacn: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(pacn)?;
        self.make_move(mv);
        Ok(mv)
    }
}

impl FromStr for Board {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Board::try_from_fen(s)
    }
}
