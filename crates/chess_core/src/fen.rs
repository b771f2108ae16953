//! Forsyth-Edwards Notation parsing and serialization.

use crate::bitboard::Bitboard;
use crate::board::{CastlingRights, Position};
use crate::error::{ChessError, ChessResult};
use crate::types::*;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Parse a FEN string. The two clock fields are optional and default to
    /// `0 1`.
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&parts.len()) {
            return Err(ChessError::fen(
                fen,
                format!("expected 4 to 6 fields, found {}", parts.len()),
            ));
        }

        let mut pos = Position::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::fen(fen, "board must have 8 ranks"));
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN lists rank 8 first
            let mut file = 0u8;
            for ch in rank_str.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if !(1..=8).contains(&d) {
                        return Err(ChessError::fen(fen, format!("bad empty-run digit '{ch}'")));
                    }
                    file += d as u8;
                } else {
                    let piece = Piece::from_char(ch).ok_or_else(|| {
                        ChessError::fen(fen, format!("invalid piece character '{ch}'"))
                    })?;
                    if file >= 8 {
                        return Err(ChessError::fen(fen, format!("rank {} overflows", rank + 1)));
                    }
                    pos.put(rank * 8 + file, piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(ChessError::fen(fen, format!("rank {} overflows", rank + 1)));
                }
            }
            if file != 8 {
                return Err(ChessError::fen(
                    fen,
                    format!("rank {} has {file} files", rank + 1),
                ));
            }
        }

        for color in Color::ALL {
            let kings = pos.pieces(color, PieceKind::King).popcount();
            if kings != 1 {
                return Err(ChessError::fen(
                    fen,
                    format!("{color:?} must have exactly one king, found {kings}"),
                ));
            }
        }
        let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
        if !(pos.bitboards.kind(PieceKind::Pawn) & back_ranks).is_empty() {
            return Err(ChessError::fen(fen, "pawn on the first or last rank"));
        }

        let side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::fen(
                    fen,
                    format!("invalid side to move '{other}'"),
                ));
            }
        };

        if pos.in_check(side_to_move.other()) {
            return Err(ChessError::fen(
                fen,
                format!("{:?} is in check but not to move", side_to_move.other()),
            ));
        }

        let mut castling = CastlingRights::NONE;
        if parts[2] != "-" {
            for c in parts[2].chars() {
                let right = match c {
                    'K' => CastlingRights::WHITE_KING,
                    'Q' => CastlingRights::WHITE_QUEEN,
                    'k' => CastlingRights::BLACK_KING,
                    'q' => CastlingRights::BLACK_QUEEN,
                    _ => {
                        return Err(ChessError::fen(
                            fen,
                            format!("invalid castling character '{c}'"),
                        ));
                    }
                };
                castling.insert(right);
            }
        }

        let en_passant = match parts[3] {
            "-" => None,
            text => {
                let sq = coord_to_sq(text)
                    .ok_or_else(|| ChessError::fen(fen, format!("invalid en-passant square '{text}'")))?;
                let expected_rank = match side_to_move {
                    Color::White => 5,
                    Color::Black => 2,
                };
                if rank_of(sq) != expected_rank {
                    return Err(ChessError::fen(
                        fen,
                        format!("en-passant square '{text}' on the wrong rank"),
                    ));
                }
                Some(sq)
            }
        };

        let halfmove_clock = match parts.get(4) {
            Some(text) => text
                .parse::<u32>()
                .map_err(|_| ChessError::fen(fen, format!("invalid halfmove clock '{text}'")))?,
            None => 0,
        };
        let fullmove_number = match parts.get(5) {
            Some(text) => text
                .parse::<u32>()
                .map_err(|_| ChessError::fen(fen, format!("invalid fullmove number '{text}'")))?,
            None => 1,
        };

        pos.set_state(
            side_to_move,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
        );
        Ok(pos)
    }

    /// Serialize to a 6-field FEN string.
    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);

        for rank in (0..8u8).rev() {
            let mut empty = 0;
            for file in 0..8u8 {
                match self.piece_at(rank * 8 + file) {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move() {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        let rights = self.castling();
        if rights.is_empty() {
            out.push('-');
        } else {
            for (flag, c) in [
                (CastlingRights::WHITE_KING, 'K'),
                (CastlingRights::WHITE_QUEEN, 'Q'),
                (CastlingRights::BLACK_KING, 'k'),
                (CastlingRights::BLACK_QUEEN, 'q'),
            ] {
                if rights.contains(flag) {
                    out.push(c);
                }
            }
        }

        out.push(' ');
        match self.en_passant() {
            Some(sq) => out.push_str(&sq_to_coord(sq)),
            None => out.push('-'),
        }

        out.push_str(&format!(
            " {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        ));
        out
    }
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
