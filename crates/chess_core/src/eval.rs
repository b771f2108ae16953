//! The evaluation seam between the search and a scoring function.

use crate::board::Position;
use crate::types::{Color, PieceKind};

/// Static evaluation oracle consulted at the search horizon.
///
/// Scores are centipawns from the side to move's point of view and must be
/// deterministic for a given position.
pub trait Evaluator: Send {
    fn evaluate(&self, pos: &Position) -> i32;

    /// Score of a drawn position (repetition, fifty-move rule, stalemate)
    /// for the side to move.
    fn draw_score(&self, _pos: &Position) -> i32 {
        0
    }

    /// Whether so little material is left that quiescence should stop
    /// skipping captures that look too small to matter.
    fn is_endgame(&self, _pos: &Position) -> bool {
        false
    }
}

/// Material values in centipawns, indexed by `PieceKind::idx()`.
pub const PIECE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 0];

/// Material balance only.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEvaluator;

impl Evaluator for MaterialEvaluator {
    fn evaluate(&self, pos: &Position) -> i32 {
        let mut score = 0i32;
        for kind in PieceKind::ALL {
            let value = PIECE_VALUES[kind.idx()];
            let white = pos.pieces(Color::White, kind).popcount() as i32;
            let black = pos.pieces(Color::Black, kind).popcount() as i32;
            score += value * (white - black);
        }
        match pos.side_to_move() {
            Color::White => score,
            Color::Black => -score,
        }
    }
}
