//! Attack sets per piece and square.
//!
//! Leaper tables are built at compile time from the directional shifts.
//! Slider lookups go through the magic tables in [`crate::magic`].

use crate::bitboard::Bitboard;
use crate::magic;
use crate::types::{Color, PieceKind};

const fn knight_targets(bb: Bitboard) -> Bitboard {
    let north = bb.north().north();
    let south = bb.south().south();
    let east = bb.east().east();
    let west = bb.west().west();
    Bitboard(
        north.east().0
            | north.west().0
            | south.east().0
            | south.west().0
            | east.north().0
            | east.south().0
            | west.north().0
            | west.south().0,
    )
}

const fn king_targets(bb: Bitboard) -> Bitboard {
    let row = Bitboard(bb.east().0 | bb.west().0 | bb.0);
    Bitboard((row.0 | row.north().0 | row.south().0) & !bb.0)
}

const fn white_pawn_targets(bb: Bitboard) -> Bitboard {
    Bitboard(bb.north_east().0 | bb.north_west().0)
}

const fn black_pawn_targets(bb: Bitboard) -> Bitboard {
    Bitboard(bb.south_east().0 | bb.south_west().0)
}

/// Build a per-square table from a single-square target function.
macro_rules! leaper_table {
    ($targets:ident) => {{
        let mut table = [Bitboard::EMPTY; 64];
        let mut sq = 0;
        while sq < 64 {
            table[sq] = $targets(Bitboard::from_square(sq as u8));
            sq += 1;
        }
        table
    }};
}

pub static KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table!(knight_targets);
pub static KING_ATTACKS: [Bitboard; 64] = leaper_table!(king_targets);
/// Squares a white pawn on each square attacks.
pub static WHITE_PAWN_ATTACKS: [Bitboard; 64] = leaper_table!(white_pawn_targets);
/// Squares a black pawn on each square attacks.
pub static BLACK_PAWN_ATTACKS: [Bitboard; 64] = leaper_table!(black_pawn_targets);

#[inline(always)]
pub fn pawn_attacks(sq: u8, color: Color) -> Bitboard {
    match color {
        Color::White => WHITE_PAWN_ATTACKS[sq as usize],
        Color::Black => BLACK_PAWN_ATTACKS[sq as usize],
    }
}

#[inline(always)]
pub fn knight_attacks(sq: u8) -> Bitboard {
    KNIGHT_ATTACKS[sq as usize]
}

#[inline(always)]
pub fn king_attacks(sq: u8) -> Bitboard {
    KING_ATTACKS[sq as usize]
}

/// Bishop attacks from `sq` given the board occupancy.
#[inline(always)]
pub fn bishop_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    magic::tables().bishop_attacks(sq, occupied)
}

/// Rook attacks from `sq` given the board occupancy.
#[inline(always)]
pub fn rook_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    magic::tables().rook_attacks(sq, occupied)
}

/// Queen attacks: the union of the rook and bishop sets.
#[inline(always)]
pub fn queen_attacks(sq: u8, occupied: Bitboard) -> Bitboard {
    let tables = magic::tables();
    tables.bishop_attacks(sq, occupied) | tables.rook_attacks(sq, occupied)
}

/// Attack set of any non-pawn piece kind.
#[inline]
pub fn piece_attacks(kind: PieceKind, sq: u8, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Knight => knight_attacks(sq),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::King => king_attacks(sq),
        PieceKind::Pawn => panic!("pawn attacks depend on color, use pawn_attacks"),
    }
}

type Step = fn(Bitboard) -> Bitboard;

const BISHOP_STEPS: [Step; 4] = [
    Bitboard::north_east,
    Bitboard::north_west,
    Bitboard::south_east,
    Bitboard::south_west,
];

const ROOK_STEPS: [Step; 4] = [
    Bitboard::north,
    Bitboard::south,
    Bitboard::east,
    Bitboard::west,
];

/// Ray-cast slider attacks, stepping square by square until a blocker.
///
/// This is the ground truth the magic tables are built from and tested
/// against; it is far too slow for the search.
pub fn slider_attacks_slow(kind: PieceKind, sq: u8, occupied: Bitboard) -> Bitboard {
    let steps: &[Step] = match kind {
        PieceKind::Bishop => &BISHOP_STEPS,
        PieceKind::Rook => &ROOK_STEPS,
        PieceKind::Queen => {
            return slider_attacks_slow(PieceKind::Bishop, sq, occupied)
                | slider_attacks_slow(PieceKind::Rook, sq, occupied);
        }
        _ => panic!("{kind:?} is not a sliding piece"),
    };

    let mut attacks = Bitboard::EMPTY;
    for step in steps {
        let mut b = Bitboard::from_square(sq);
        loop {
            b = step(b);
            if b.is_empty() {
                break;
            }
            attacks |= b;
            if !(b & occupied).is_empty() {
                break;
            }
        }
    }
    attacks
}

#[cfg(test)]
#[path = "attacks_tests.rs"]
mod attacks_tests;
