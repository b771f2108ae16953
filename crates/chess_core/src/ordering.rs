//! Move ordering heuristics.
//!
//! Scores are written into each move's `score` field; the search then picks
//! moves highest first with [`MoveList::pick_best`].

use crate::bitboard::Bitboard;
use crate::board::Position;
use crate::movelist::MoveList;
use crate::search::MAX_PLY;
use crate::types::{Color, Move, MoveKind, PieceKind};

pub const PV_SCORE: i32 = 1_000_000;
pub const TT_SCORE: i32 = 900_000;
pub const CAPTURE_SCORE: i32 = 100_000;
pub const PROMOTION_SCORE: i32 = 90_000;
pub const KILLER_SCORES: [i32; 2] = [80_000, 79_000];
pub const CASTLE_SCORE: i32 = 1_000;

/// Most valuable victim first, least valuable attacker as tie-break.
#[inline]
pub fn mvv_lva(victim: PieceKind, attacker: PieceKind) -> i32 {
    10 * (victim.idx() as i32 + 1) - attacker.idx() as i32
}

/// Kind of the piece `mv` would capture, if any.
#[inline]
pub fn captured_kind(pos: &Position, mv: Move) -> Option<PieceKind> {
    match mv.kind {
        MoveKind::EnPassant => Some(PieceKind::Pawn),
        _ => pos.piece_at(mv.to).map(|p| p.kind),
    }
}

/// Exchange values for [`see`]. The king outweighs any material it could win.
const SEE_VALUES: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

fn least_valuable(pos: &Position, attackers: Bitboard, side: Color) -> Option<(PieceKind, u8)> {
    PieceKind::ALL.into_iter().find_map(|kind| {
        let set = attackers & pos.pieces(side, kind);
        (!set.is_empty()).then(|| (kind, set.lsb()))
    })
}

/// Static exchange evaluation of `mv`: the material the mover nets when
/// both sides keep recapturing on the target square with their cheapest
/// attacker, either side free to stand pat. Sliders uncovered behind a
/// capturer join the exchange. Non-captures score 0.
pub fn see(pos: &Position, mv: Move) -> i32 {
    let (Some(victim), Some(mover)) = (captured_kind(pos, mv), pos.piece_at(mv.from)) else {
        return 0;
    };

    let mut gain = [0i32; 32];
    let mut depth = 0;
    gain[0] = SEE_VALUES[victim.idx()];

    let mut occupied = pos.occupied() ^ Bitboard::from_square(mv.from);
    if mv.kind == MoveKind::EnPassant {
        let captured = match mover.color {
            Color::White => mv.to - 8,
            Color::Black => mv.to + 8,
        };
        occupied ^= Bitboard::from_square(captured);
    }
    let mut on_target = mover.kind;
    let mut side = mover.color.other();

    while depth + 1 < gain.len() {
        let attackers = pos.attackers_to(mv.to, occupied) & occupied & pos.occupancy(side);
        let Some((kind, from)) = least_valuable(pos, attackers, side) else {
            break;
        };
        depth += 1;
        gain[depth] = SEE_VALUES[on_target.idx()] - gain[depth - 1];
        if (-gain[depth - 1]).max(gain[depth]) < 0 {
            break;
        }
        occupied ^= Bitboard::from_square(from);
        on_target = kind;
        side = side.other();
    }

    while depth > 0 {
        gain[depth - 1] = -(-gain[depth - 1]).max(gain[depth]);
        depth -= 1;
    }
    gain[0]
}

/// Ordering score for a capture, or `None` for a quiet move.
#[inline]
fn capture_score(pos: &Position, mv: Move) -> Option<i32> {
    let victim = captured_kind(pos, mv)?;
    let attacker = pos.piece_at(mv.from).map_or(PieceKind::Pawn, |p| p.kind);
    let promo = mv.promotion().map_or(0, |k| k.idx() as i32);
    Some(CAPTURE_SCORE + mvv_lva(victim, attacker) + promo)
}

/// Score every move in `list` for the main search.
pub fn score_moves(
    pos: &Position,
    list: &mut MoveList,
    pv_move: Option<Move>,
    tt_move: Option<Move>,
    killers: [Option<Move>; 2],
) {
    for mv in list.as_mut_slice() {
        mv.score = if Some(*mv) == pv_move {
            PV_SCORE
        } else if Some(*mv) == tt_move {
            TT_SCORE
        } else if let Some(score) = capture_score(pos, *mv) {
            score
        } else if let Some(kind) = mv.promotion() {
            PROMOTION_SCORE + kind.idx() as i32
        } else if Some(*mv) == killers[0] {
            KILLER_SCORES[0]
        } else if Some(*mv) == killers[1] {
            KILLER_SCORES[1]
        } else if mv.kind == MoveKind::Castle {
            CASTLE_SCORE
        } else {
            0
        };
    }
}

/// Score a capture list for quiescence: MVV-LVA only.
pub fn score_captures(pos: &Position, list: &mut MoveList) {
    for mv in list.as_mut_slice() {
        mv.score = capture_score(pos, *mv)
            .unwrap_or_else(|| PROMOTION_SCORE + mv.promotion().map_or(0, |k| k.idx() as i32));
    }
}

/// Two quiet moves per ply that recently caused a beta cutoff.
pub struct Killers {
    slots: Vec<[Option<Move>; 2]>,
}

impl Killers {
    pub fn new() -> Self {
        Self {
            slots: vec![[None; 2]; MAX_PLY],
        }
    }

    #[inline]
    pub fn get(&self, ply: usize) -> [Option<Move>; 2] {
        self.slots.get(ply).copied().unwrap_or([None; 2])
    }

    /// Record a cutoff move. The previous first killer moves to second
    /// unless `mv` already is the first killer.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slot) = self.slots.get_mut(ply) else {
            return;
        };
        if slot[0] == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(mv);
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = [None; 2]);
    }
}

impl Default for Killers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "ordering_tests.rs"]
mod ordering_tests;
