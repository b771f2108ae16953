//! Position representation: piece bitboards, a mailbox kept in sync with
//! them, game state flags and an incrementally maintained Zobrist hash.

use std::fmt;
use std::ops::BitOr;

use crate::attacks::{bishop_attacks, king_attacks, knight_attacks, pawn_attacks, rook_attacks};
use crate::bitboard::Bitboard;
use crate::types::*;
use crate::zobrist::ZOBRIST;

/// Castling rights as a 4-bit flag set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KING: CastlingRights = CastlingRights(1);
    pub const WHITE_QUEEN: CastlingRights = CastlingRights(2);
    pub const BLACK_KING: CastlingRights = CastlingRights(4);
    pub const BLACK_QUEEN: CastlingRights = CastlingRights(8);
    pub const ALL: CastlingRights = CastlingRights(15);

    #[inline(always)]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub const fn from_bits(bits: u8) -> Self {
        CastlingRights(bits & 15)
    }

    #[inline(always)]
    pub const fn contains(self, other: CastlingRights) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline(always)]
    pub fn insert(&mut self, other: CastlingRights) {
        self.0 |= other.0;
    }

    #[inline(always)]
    pub fn remove(&mut self, other: CastlingRights) {
        self.0 &= !other.0;
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn kingside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_KING,
            Color::Black => Self::BLACK_KING,
        }
    }

    pub const fn queenside(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_QUEEN,
            Color::Black => Self::BLACK_QUEEN,
        }
    }
}

impl BitOr for CastlingRights {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        CastlingRights(self.0 | rhs.0)
    }
}

/// Rights that survive a move touching each square. A move keeps
/// `KEEP[from] & KEEP[to]`, which drops the right of a rook leaving its
/// corner or being captured there, and both rights of a king leaving home.
const CASTLING_KEEP: [u8; 64] = {
    let mut keep = [15u8; 64];
    keep[A1 as usize] = 15 & !CastlingRights::WHITE_QUEEN.0;
    keep[H1 as usize] = 15 & !CastlingRights::WHITE_KING.0;
    keep[E1 as usize] = 15 & !(CastlingRights::WHITE_KING.0 | CastlingRights::WHITE_QUEEN.0);
    keep[A8 as usize] = 15 & !CastlingRights::BLACK_QUEEN.0;
    keep[H8 as usize] = 15 & !CastlingRights::BLACK_KING.0;
    keep[E8 as usize] = 15 & !(CastlingRights::BLACK_KING.0 | CastlingRights::BLACK_QUEEN.0);
    keep
};

/// Rook relocation for a castling move, keyed by the king's target square.
#[inline]
pub fn castling_rook_squares(king_to: u8) -> (u8, u8) {
    match king_to {
        G1 => (H1, F1),
        C1 => (A1, D1),
        G8 => (H8, F8),
        C8 => (A8, D8),
        _ => panic!("{} is not a castling target", sq_to_coord(king_to)),
    }
}

/// One bitboard per (color, piece kind) plus cached per-color occupancy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PieceBoards {
    pieces: [[Bitboard; 6]; 2],
    colors: [Bitboard; 2],
}

impl PieceBoards {
    #[inline(always)]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.pieces[color.idx()][kind.idx()]
    }

    #[inline(always)]
    pub fn color(&self, color: Color) -> Bitboard {
        self.colors[color.idx()]
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.colors[0] | self.colors[1]
    }

    /// Both colors' pieces of one kind.
    #[inline(always)]
    pub fn kind(&self, kind: PieceKind) -> Bitboard {
        self.pieces[0][kind.idx()] | self.pieces[1][kind.idx()]
    }

    #[inline(always)]
    fn toggle(&mut self, piece: Piece, sq: u8) {
        let bit = Bitboard::from_square(sq);
        self.pieces[piece.color.idx()][piece.kind.idx()] ^= bit;
        self.colors[piece.color.idx()] ^= bit;
    }
}

#[derive(Clone, Debug)]
pub struct Position {
    pub bitboards: PieceBoards,
    board: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    /// Square behind a pawn that just advanced two ranks.
    en_passant: Option<u8>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
}

/// Everything `unmake_move` needs that the move itself does not carry.
#[derive(Clone, Copy, Debug, Default)]
pub struct Undo {
    pub captured: Option<Piece>,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub hash: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct NullUndo {
    pub en_passant: Option<u8>,
    pub halfmove_clock: u32,
    pub hash: u64,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.board == other.board
            && self.side_to_move == other.side_to_move
            && self.castling == other.castling
            && self.en_passant == other.en_passant
            && self.halfmove_clock == other.halfmove_clock
            && self.fullmove_number == other.fullmove_number
            && self.hash == other.hash
            && self.bitboards == other.bitboards
    }
}

impl Eq for Position {}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    /// A board with no pieces, White to move, no rights.
    pub(crate) fn empty() -> Self {
        Position {
            bitboards: PieceBoards::default(),
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    pub fn startpos() -> Self {
        let mut p = Position::empty();

        for f in 0..8u8 {
            p.put(8 + f, Piece::new(Color::White, PieceKind::Pawn));
            p.put(48 + f, Piece::new(Color::Black, PieceKind::Pawn));
        }
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.put(f as u8, Piece::new(Color::White, kind));
            p.put(56 + f as u8, Piece::new(Color::Black, kind));
        }
        p.castling = CastlingRights::ALL;
        p.hash = p.compute_hash();
        p
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline(always)]
    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }

    #[inline(always)]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline(always)]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline(always)]
    pub fn en_passant(&self) -> Option<u8> {
        self.en_passant
    }

    #[inline(always)]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline(always)]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// The incrementally maintained hash.
    #[inline(always)]
    pub fn position_hash(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    pub fn pieces(&self, color: Color, kind: PieceKind) -> Bitboard {
        self.bitboards.pieces(color, kind)
    }

    #[inline(always)]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.bitboards.color(color)
    }

    #[inline(always)]
    pub fn occupied(&self) -> Bitboard {
        self.bitboards.occupied()
    }

    /// Square of `color`'s king.
    ///
    /// # Panics
    /// Panics if that side has no king, which a parsed position never allows.
    #[inline(always)]
    pub fn king_square(&self, color: Color) -> u8 {
        self.pieces(color, PieceKind::King).lsb()
    }

    // -------------------------------------------------------------------------
    // Setup (used by the FEN parser)
    // -------------------------------------------------------------------------

    pub(crate) fn set_state(
        &mut self,
        side_to_move: Color,
        castling: CastlingRights,
        en_passant: Option<u8>,
        halfmove_clock: u32,
        fullmove_number: u32,
    ) {
        self.side_to_move = side_to_move;
        self.castling = castling;
        self.en_passant = en_passant;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
        self.hash = self.compute_hash();
    }

    /// Place a piece on an empty square without touching the hash.
    #[inline(always)]
    pub(crate) fn put(&mut self, sq: u8, piece: Piece) {
        debug_assert!(self.board[sq as usize].is_none(), "square already occupied");
        self.board[sq as usize] = Some(piece);
        self.bitboards.toggle(piece, sq);
    }

    /// Lift whatever stands on `sq` without touching the hash.
    #[inline(always)]
    fn take(&mut self, sq: u8) -> Option<Piece> {
        let piece = self.board[sq as usize].take()?;
        self.bitboards.toggle(piece, sq);
        Some(piece)
    }

    // -------------------------------------------------------------------------
    // Hashing
    // -------------------------------------------------------------------------

    /// Hash recomputed from scratch. Always equals [`Self::position_hash`].
    pub fn compute_hash(&self) -> u64 {
        let mut h = 0u64;
        for (sq, piece) in self.board.iter().enumerate() {
            if let Some(p) = piece {
                h ^= ZOBRIST.piece_key(*p, sq as u8);
            }
        }
        if self.side_to_move == Color::Black {
            h ^= ZOBRIST.side_to_move;
        }
        h ^= ZOBRIST.castling_key(self.castling);
        if let Some(ep) = self.en_passant {
            h ^= ZOBRIST.ep_key(ep);
        }
        h
    }

    // -------------------------------------------------------------------------
    // Attacks and check
    // -------------------------------------------------------------------------

    /// Pieces of both colors attacking `sq`, given an occupancy.
    pub fn attackers_to(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        let b = &self.bitboards;
        let diagonal = b.kind(PieceKind::Bishop) | b.kind(PieceKind::Queen);
        let straight = b.kind(PieceKind::Rook) | b.kind(PieceKind::Queen);

        (pawn_attacks(sq, Color::Black) & b.pieces(Color::White, PieceKind::Pawn))
            | (pawn_attacks(sq, Color::White) & b.pieces(Color::Black, PieceKind::Pawn))
            | (knight_attacks(sq) & b.kind(PieceKind::Knight))
            | (king_attacks(sq) & b.kind(PieceKind::King))
            | (bishop_attacks(sq, occupied) & diagonal)
            | (rook_attacks(sq, occupied) & straight)
    }

    pub fn is_square_attacked(&self, sq: u8, by: Color) -> bool {
        let b = &self.bitboards;
        // A pawn of `by` attacks sq exactly when a pawn of the other color on
        // sq would attack it.
        if !(pawn_attacks(sq, by.other()) & b.pieces(by, PieceKind::Pawn)).is_empty() {
            return true;
        }
        if !(knight_attacks(sq) & b.pieces(by, PieceKind::Knight)).is_empty() {
            return true;
        }
        if !(king_attacks(sq) & b.pieces(by, PieceKind::King)).is_empty() {
            return true;
        }
        let occupied = b.occupied();
        let queens = b.pieces(by, PieceKind::Queen);
        if !(bishop_attacks(sq, occupied) & (b.pieces(by, PieceKind::Bishop) | queens)).is_empty()
        {
            return true;
        }
        !(rook_attacks(sq, occupied) & (b.pieces(by, PieceKind::Rook) | queens)).is_empty()
    }

    #[inline]
    pub fn in_check(&self, color: Color) -> bool {
        self.is_square_attacked(self.king_square(color), color.other())
    }

    /// True when the side that just moved did not leave its king attacked.
    #[inline]
    pub fn is_legal(&self) -> bool {
        !self.in_check(self.side_to_move.other())
    }

    // -------------------------------------------------------------------------
    // Draw rules and material queries
    // -------------------------------------------------------------------------

    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can possibly mate: bare kings, a single minor piece, or
    /// bishops only, all on squares of one color.
    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.bitboards;
        let heavy = b.kind(PieceKind::Pawn) | b.kind(PieceKind::Rook) | b.kind(PieceKind::Queen);
        if !heavy.is_empty() {
            return false;
        }
        let knights = b.kind(PieceKind::Knight);
        let bishops = b.kind(PieceKind::Bishop);
        let minors = (knights | bishops).popcount();
        if minors <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }
        const LIGHT_SQUARES: u64 = 0x55AA_55AA_55AA_55AA;
        (bishops.0 & LIGHT_SQUARES) == 0 || (bishops.0 & !LIGHT_SQUARES) == 0
    }

    /// Whether `color` has anything besides pawns and the king.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let b = &self.bitboards;
        let pawns_and_king = b.pieces(color, PieceKind::Pawn) | b.pieces(color, PieceKind::King);
        b.color(color) != pawns_and_king
    }

    // -------------------------------------------------------------------------
    // Make / unmake
    // -------------------------------------------------------------------------

    /// Apply a pseudo-legal move generated for this position.
    ///
    /// # Panics
    /// Panics if the source square is empty.
    pub fn make_move(&mut self, mv: Move) -> Undo {
        let us = self.side_to_move;
        let moved = self
            .piece_at(mv.from)
            .expect("make_move: no piece on the source square");

        let mut undo = Undo {
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            hash: self.hash,
        };

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.ep_key(ep);
        }

        // Capture
        let capture_sq = match mv.kind {
            MoveKind::EnPassant => match us {
                Color::White => mv.to - 8,
                Color::Black => mv.to + 8,
            },
            _ => mv.to,
        };
        if let Some(captured) = self.take(capture_sq) {
            self.hash ^= ZOBRIST.piece_key(captured, capture_sq);
            undo.captured = Some(captured);
        }

        // Relocate the mover, swapping in the promotion piece
        self.take(mv.from);
        self.hash ^= ZOBRIST.piece_key(moved, mv.from);
        let placed = match mv.kind {
            MoveKind::Promotion(kind) => Piece::new(us, kind),
            _ => moved,
        };
        self.put(mv.to, placed);
        self.hash ^= ZOBRIST.piece_key(placed, mv.to);

        if mv.kind == MoveKind::Castle {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            let rook = self
                .take(rook_from)
                .expect("make_move: castling without a rook");
            self.put(rook_to, rook);
            self.hash ^= ZOBRIST.piece_key(rook, rook_from) ^ ZOBRIST.piece_key(rook, rook_to);
        }

        let mut rights = CastlingRights::from_bits(
            self.castling.bits() & CASTLING_KEEP[mv.from as usize] & CASTLING_KEEP[mv.to as usize],
        );
        if moved.kind == PieceKind::King {
            rights.remove(CastlingRights::kingside(us) | CastlingRights::queenside(us));
        }
        if rights != self.castling {
            self.hash ^= ZOBRIST.castling_key(self.castling) ^ ZOBRIST.castling_key(rights);
            self.castling = rights;
        }

        if moved.kind == PieceKind::Pawn && mv.from.abs_diff(mv.to) == 16 {
            let ep = (mv.from + mv.to) / 2;
            self.en_passant = Some(ep);
            self.hash ^= ZOBRIST.ep_key(ep);
        }

        if moved.kind == PieceKind::Pawn || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }

        self.side_to_move = us.other();
        self.hash ^= ZOBRIST.side_to_move;

        undo
    }

    /// Exactly reverse `make_move(mv)` using the record it returned.
    pub fn unmake_move(&mut self, mv: Move, undo: &Undo) {
        self.side_to_move = self.side_to_move.other();
        let us = self.side_to_move;

        if mv.kind == MoveKind::Castle {
            let (rook_from, rook_to) = castling_rook_squares(mv.to);
            if let Some(rook) = self.take(rook_to) {
                self.put(rook_from, rook);
            }
        }

        let placed = self
            .take(mv.to)
            .expect("unmake_move: no piece on the target square");
        let moved = match mv.kind {
            MoveKind::Promotion(_) => Piece::new(us, PieceKind::Pawn),
            _ => placed,
        };
        self.put(mv.from, moved);

        if let Some(captured) = undo.captured {
            let capture_sq = match mv.kind {
                MoveKind::EnPassant => match us {
                    Color::White => mv.to - 8,
                    Color::Black => mv.to + 8,
                },
                _ => mv.to,
            };
            self.put(capture_sq, captured);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.hash = undo.hash;
    }

    /// Pass the turn. Used by null-move pruning only.
    ///
    /// The half-move clock is reset so repetition scans never look across
    /// a null move.
    pub fn make_null_move(&mut self) -> NullUndo {
        let undo = NullUndo {
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        };
        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.ep_key(ep);
        }
        self.halfmove_clock = 0;
        self.side_to_move = self.side_to_move.other();
        self.hash ^= ZOBRIST.side_to_move;
        undo
    }

    pub fn unmake_null_move(&mut self, undo: &NullUndo) {
        self.side_to_move = self.side_to_move.other();
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8u8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8u8 {
                let c = self.piece_at(rank * 8 + file).map_or('.', Piece::to_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "   a b c d e f g h")?;
        writeln!(f)?;
        writeln!(f, "Fen: {}", self.to_fen())?;
        write!(f, "Key: {:016X}", self.hash)
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
