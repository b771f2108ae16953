//! Material and piece-square evaluation, tapered between middlegame and
//! endgame by the amount of non-pawn material left.

use chess_core::{Bitboard, Color, Evaluator, PIECE_VALUES, PieceKind, Position};

/// Draw penalty for the side that was to move at the root, while enough
/// material is left to play for a win.
pub const DEFAULT_CONTEMPT: i32 = 100;

const KNIGHT_PHASE: i32 = 1;
const BISHOP_PHASE: i32 = 1;
const ROOK_PHASE: i32 = 2;
const QUEEN_PHASE: i32 = 4;
const MAX_PHASE: i32 = 4 * KNIGHT_PHASE + 4 * BISHOP_PHASE + 4 * ROOK_PHASE + 2 * QUEEN_PHASE;
const ENDGAME_PHASE: i32 = MAX_PHASE / 2;

// Tables are laid out as printed boards, rank 8 first, from White's side.
// White pieces look up `sq ^ 56`, Black pieces `sq`.
#[rustfmt::skip]
const PAWN_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
    50, 50, 50, 50, 50, 50, 50, 50,
    10, 10, 20, 30, 30, 20, 10, 10,
     5,  5, 10, 25, 25, 10,  5,  5,
     0,  0,  0, 20, 20,  0,  0,  0,
     5, -5,-10,  0,  0,-10, -5,  5,
     5, 10, 10,-20,-20, 10, 10,  5,
     0,  0,  0,  0,  0,  0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT_PST: [i32; 64] = [
   -50,-40,-30,-30,-30,-30,-40,-50,
   -40,-20,  0,  0,  0,  0,-20,-40,
   -30,  0, 10, 15, 15, 10,  0,-30,
   -30,  5, 15, 20, 20, 15,  5,-30,
   -30,  0, 15, 20, 20, 15,  0,-30,
   -30,  5, 10, 15, 15, 10,  5,-30,
   -40,-20,  0,  5,  5,  0,-20,-40,
   -50,-40,-30,-30,-30,-30,-40,-50,
];

#[rustfmt::skip]
const BISHOP_PST: [i32; 64] = [
   -20,-10,-10,-10,-10,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5, 10, 10,  5,  0,-10,
   -10,  5,  5, 10, 10,  5,  5,-10,
   -10,  0, 10, 10, 10, 10,  0,-10,
   -10, 10, 10, 10, 10, 10, 10,-10,
   -10,  5,  0,  0,  0,  0,  5,-10,
   -20,-10,-10,-10,-10,-10,-10,-20,
];

#[rustfmt::skip]
const ROOK_PST: [i32; 64] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN_PST: [i32; 64] = [
   -20,-10,-10, -5, -5,-10,-10,-20,
   -10,  0,  0,  0,  0,  0,  0,-10,
   -10,  0,  5,  5,  5,  5,  0,-10,
    -5,  0,  5,  5,  5,  5,  0, -5,
     0,  0,  5,  5,  5,  5,  0, -5,
   -10,  5,  5,  5,  5,  5,  0,-10,
   -10,  0,  5,  0,  0,  0,  0,-10,
   -20,-10,-10, -5, -5,-10,-10,-20,
];

#[rustfmt::skip]
const KING_MIDGAME_PST: [i32; 64] = [
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -30,-40,-40,-50,-50,-40,-40,-30,
   -20,-30,-30,-40,-40,-30,-30,-20,
   -10,-20,-20,-20,-20,-20,-20,-10,
    20, 20,  0,  0,  0,  0, 20, 20,
    20, 30, 10,  0,  0, 10, 30, 20,
];

#[rustfmt::skip]
const KING_ENDGAME_PST: [i32; 64] = [
   -50,-40,-30,-20,-20,-30,-40,-50,
   -30,-20,-10,  0,  0,-10,-20,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 30, 40, 40, 30,-10,-30,
   -30,-10, 20, 30, 30, 20,-10,-30,
   -30,-30,  0,  0,  0,  0,-30,-30,
   -50,-30,-30,-30,-30,-30,-30,-50,
];

fn table(kind: PieceKind) -> &'static [i32; 64] {
    match kind {
        PieceKind::Pawn => &PAWN_PST,
        PieceKind::Knight => &KNIGHT_PST,
        PieceKind::Bishop => &BISHOP_PST,
        PieceKind::Rook => &ROOK_PST,
        PieceKind::Queen => &QUEEN_PST,
        PieceKind::King => &KING_MIDGAME_PST,
    }
}

#[inline]
fn pst_index(color: Color, sq: u8) -> usize {
    match color {
        Color::White => (sq ^ 56) as usize,
        Color::Black => sq as usize,
    }
}

/// Non-pawn material on the board, from 0 (bare kings and pawns) to 24.
pub fn game_phase(pos: &Position) -> i32 {
    let count = |kind| {
        Color::ALL
            .iter()
            .map(|&c| pos.pieces(c, kind).popcount() as i32)
            .sum::<i32>()
    };
    let phase = KNIGHT_PHASE * count(PieceKind::Knight)
        + BISHOP_PHASE * count(PieceKind::Bishop)
        + ROOK_PHASE * count(PieceKind::Rook)
        + QUEEN_PHASE * count(PieceKind::Queen);
    phase.min(MAX_PHASE)
}

pub fn is_endgame(pos: &Position) -> bool {
    game_phase(pos) < ENDGAME_PHASE
}

/// Evaluation of one side from White's point of view, split into the
/// middlegame and endgame terms.
fn side_terms(pos: &Position, color: Color) -> (i32, i32) {
    let mut midgame = 0;
    let mut endgame = 0;
    for kind in PieceKind::ALL {
        let pieces: Bitboard = pos.pieces(color, kind);
        for sq in pieces {
            let idx = pst_index(color, sq);
            let value = PIECE_VALUES[kind.idx()];
            midgame += value + table(kind)[idx];
            endgame += value
                + match kind {
                    PieceKind::King => KING_ENDGAME_PST[idx],
                    _ => table(kind)[idx],
                };
        }
    }
    (midgame, endgame)
}

/// Material plus piece-square tables, with contempt for early draws.
#[derive(Debug, Clone, Copy)]
pub struct ClassicalEvaluator {
    pub contempt: i32,
    /// Side to move at the root of the current search; contempt is charged
    /// to this side.
    pub root_side: Color,
}

impl Default for ClassicalEvaluator {
    fn default() -> Self {
        Self {
            contempt: DEFAULT_CONTEMPT,
            root_side: Color::White,
        }
    }
}

impl Evaluator for ClassicalEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let (white_mg, white_eg) = side_terms(pos, Color::White);
        let (black_mg, black_eg) = side_terms(pos, Color::Black);
        let phase = game_phase(pos);
        let score = ((white_mg - black_mg) * phase + (white_eg - black_eg) * (MAX_PHASE - phase))
            / MAX_PHASE;

        match pos.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        }
    }

    fn draw_score(&self, pos: &Position) -> i32 {
        if is_endgame(pos) {
            return 0;
        }
        if pos.side_to_move() == self.root_side {
            -self.contempt
        } else {
            self.contempt
        }
    }

    fn is_endgame(&self, pos: &Position) -> bool {
        is_endgame(pos)
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod eval_tests;
