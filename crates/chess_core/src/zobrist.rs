//! Zobrist keys for incremental position hashing.
//!
//! The hash of a position is the XOR of:
//! - one key per (color, piece kind, square) that is occupied (768 keys)
//! - the side key when Black is to move
//! - one key per castling right that is still available (4 keys)
//! - the file key of the en-passant target, whenever one is set (8 keys)
//!
//! Keys come from a fixed-seed xorshift64 stream evaluated at compile time.

use crate::board::CastlingRights;
use crate::types::Piece;

/// Fixed-seed xorshift64 stream usable in const context.
struct KeyStream(u64);

impl KeyStream {
    const fn next(mut self) -> (Self, u64) {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        let key = self.0;
        (self, key)
    }

    const fn fill<const N: usize>(mut self) -> (Self, [u64; N]) {
        let mut out = [0u64; N];
        let mut i = 0;
        while i < N {
            let (rest, key) = self.next();
            self = rest;
            out[i] = key;
            i += 1;
        }
        (self, out)
    }
}

const KEY_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct ZobristKeys {
    /// Indexed by `[color][piece_kind][square]`.
    pub pieces: [[[u64; 64]; 6]; 2],
    pub side_to_move: u64,
    /// One key per castling bit, in bit order (WK, WQ, BK, BQ).
    pub castling: [u64; 4],
    pub en_passant: [u64; 8],
    /// XOR of `castling` over every subset of rights, indexed by the bits.
    castling_sets: [u64; 16],
}

impl Default for ZobristKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl ZobristKeys {
    pub const fn new() -> Self {
        let mut stream = KeyStream(KEY_SEED);
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut table = 0;
        while table < 12 {
            let (rest, keys) = stream.fill::<64>();
            stream = rest;
            pieces[table / 6][table % 6] = keys;
            table += 1;
        }

        let (stream, side_to_move) = stream.next();
        let (stream, castling) = stream.fill::<4>();
        let (_, en_passant) = stream.fill::<8>();

        let mut castling_sets = [0u64; 16];
        let mut bits = 1;
        while bits < 16 {
            // Add the lowest right to the set without it.
            let low = (bits as u32).trailing_zeros() as usize;
            castling_sets[bits] = castling_sets[bits & (bits - 1)] ^ castling[low];
            bits += 1;
        }

        ZobristKeys {
            pieces,
            side_to_move,
            castling,
            en_passant,
            castling_sets,
        }
    }

    #[inline(always)]
    pub fn piece_key(&self, piece: Piece, sq: u8) -> u64 {
        self.pieces[piece.color.idx()][piece.kind.idx()][sq as usize]
    }

    /// Combined key of every right present in `rights`.
    #[inline(always)]
    pub fn castling_key(&self, rights: CastlingRights) -> u64 {
        self.castling_sets[rights.bits() as usize & 0xF]
    }

    /// Key for an en-passant target square; only its file matters.
    #[inline(always)]
    pub fn ep_key(&self, ep_square: u8) -> u64 {
        self.en_passant[(ep_square % 8) as usize]
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::new();

#[cfg(test)]
#[path = "zobrist_tests.rs"]
mod zobrist_tests;
