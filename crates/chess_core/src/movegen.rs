//! Pseudo-legal move generation on bitboards.
//!
//! Moves come out grouped by piece kind (pawns first, king last), by source
//! square ascending within a kind and by target square ascending within a
//! source. Castling follows the king's ordinary moves. Nothing here checks
//! whether the mover's own king is left attacked; callers make the move and
//! ask [`Position::is_legal`].

use crate::attacks::{pawn_attacks, piece_attacks};
use crate::bitboard::Bitboard;
use crate::board::{CastlingRights, Position};
use crate::movelist::MoveList;
use crate::types::*;

/// Generate every legal move into a fresh list.
pub fn legal_moves(pos: &Position) -> MoveList {
    let mut tmp = pos.clone();
    let mut out = MoveList::new();
    legal_moves_into(&mut tmp, &mut out);
    out
}

/// Generate every legal move into `out`, reusing its storage.
///
/// The position is used as scratch space and is restored before returning.
pub fn legal_moves_into(pos: &mut Position, out: &mut MoveList) {
    pseudo_moves(pos, out);
    out.retain(|mv| {
        let undo = pos.make_move(mv);
        let legal = pos.is_legal();
        pos.unmake_move(mv, &undo);
        legal
    });
}

/// All pseudo-legal moves for the side to move.
pub fn pseudo_moves(pos: &Position, out: &mut MoveList) {
    out.clear();
    generate(pos, out, false);
}

/// Captures, en-passant captures and promotions only, for quiescence.
pub fn pseudo_captures(pos: &Position, out: &mut MoveList) {
    out.clear();
    generate(pos, out, true);
}

fn generate(pos: &Position, out: &mut MoveList, captures_only: bool) {
    let us = pos.side_to_move();
    let own = pos.occupancy(us);
    let enemy = pos.occupancy(us.other());
    let occupied = own | enemy;
    let target_mask = if captures_only { enemy } else { !own };

    for from in pos.pieces(us, PieceKind::Pawn) {
        gen_pawn(pos, from, us, enemy, occupied, captures_only, out);
    }

    for kind in [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ] {
        for from in pos.pieces(us, kind) {
            for to in piece_attacks(kind, from, occupied) & target_mask {
                out.push(Move::new(from, to));
            }
        }
    }

    if !captures_only {
        gen_castling(pos, us, occupied, out);
    }
}

fn gen_pawn(
    pos: &Position,
    from: u8,
    us: Color,
    enemy: Bitboard,
    occupied: Bitboard,
    captures_only: bool,
    out: &mut MoveList,
) {
    let bb = Bitboard::from_square(from);
    let (single, start_rank, promo_rank) = match us {
        Color::White => (bb.north() & !occupied, Bitboard::RANK_2, Bitboard::RANK_8),
        Color::Black => (bb.south() & !occupied, Bitboard::RANK_7, Bitboard::RANK_1),
    };

    let mut targets = Bitboard::EMPTY;
    if captures_only {
        targets |= single & promo_rank;
    } else {
        targets |= single;
        if !single.is_empty() && start_rank.contains(from) {
            let double = match us {
                Color::White => single.north(),
                Color::Black => single.south(),
            };
            targets |= double & !occupied;
        }
    }

    let attacks = pawn_attacks(from, us);
    targets |= attacks & enemy;
    let ep = pos.en_passant();
    if let Some(ep_sq) = ep
        && attacks.contains(ep_sq)
    {
        targets |= Bitboard::from_square(ep_sq);
    }

    for to in targets {
        if promo_rank.contains(to) {
            for kind in PieceKind::PROMOTIONS {
                out.push(Move::with_kind(from, to, MoveKind::Promotion(kind)));
            }
        } else if Some(to) == ep && file_of(to) != file_of(from) {
            out.push(Move::with_kind(from, to, MoveKind::EnPassant));
        } else {
            out.push(Move::new(from, to));
        }
    }
}

/// Squares involved in one castling move.
struct CastleRule {
    right: fn(Color) -> CastlingRights,
    king_to: u8,
    rook_from: u8,
    /// Must be empty.
    between: Bitboard,
    /// Square the king crosses and the square it lands on; neither may be attacked.
    path: [u8; 2],
}

const fn squares(list: &[u8]) -> Bitboard {
    let mut bb = 0u64;
    let mut i = 0;
    while i < list.len() {
        bb |= 1u64 << list[i];
        i += 1;
    }
    Bitboard(bb)
}

/// Kingside then queenside, per color.
const CASTLE_RULES: [[CastleRule; 2]; 2] = [
    [
        CastleRule {
            right: CastlingRights::kingside,
            king_to: G1,
            rook_from: H1,
            between: squares(&[F1, G1]),
            path: [F1, G1],
        },
        CastleRule {
            right: CastlingRights::queenside,
            king_to: C1,
            rook_from: A1,
            between: squares(&[B1, C1, D1]),
            path: [D1, C1],
        },
    ],
    [
        CastleRule {
            right: CastlingRights::kingside,
            king_to: G8,
            rook_from: H8,
            between: squares(&[F8, G8]),
            path: [F8, G8],
        },
        CastleRule {
            right: CastlingRights::queenside,
            king_to: C8,
            rook_from: A8,
            between: squares(&[B8, C8, D8]),
            path: [D8, C8],
        },
    ],
];

fn gen_castling(pos: &Position, us: Color, occupied: Bitboard, out: &mut MoveList) {
    let rights = pos.castling();
    let king_from = match us {
        Color::White => E1,
        Color::Black => E8,
    };
    if pos.piece_at(king_from) != Some(Piece::new(us, PieceKind::King)) {
        return;
    }

    let them = us.other();
    let rook = Some(Piece::new(us, PieceKind::Rook));
    let mut in_check = None;

    for rule in &CASTLE_RULES[us.idx()] {
        if !rights.contains((rule.right)(us))
            || pos.piece_at(rule.rook_from) != rook
            || !(occupied & rule.between).is_empty()
        {
            continue;
        }
        if *in_check.get_or_insert_with(|| pos.is_square_attacked(king_from, them)) {
            return;
        }
        if rule.path.iter().any(|&sq| pos.is_square_attacked(sq, them)) {
            continue;
        }
        out.push(Move::with_kind(king_from, rule.king_to, MoveKind::Castle));
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
