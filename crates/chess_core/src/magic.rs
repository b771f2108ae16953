//! Magic bitboard tables for sliding piece attacks.
//!
//! For every square the relevant occupancy (the slider's empty-board rays
//! minus the board edge) is hashed by a multiplication with a per-square
//! "magic" constant into a dense slice of a shared attack table. The magics
//! are found once at startup by a randomized trial-and-retry search seeded
//! with [`MAGIC_SEED`], so the tables are identical on every run.

use std::sync::OnceLock;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::debug;

use crate::attacks::slider_attacks_slow;
use crate::bitboard::Bitboard;
use crate::types::PieceKind;

/// Seed for the magic number search.
pub const MAGIC_SEED: u64 = 0x0C1E_4D41_4749_4353;

/// Magic lookup parameters for one square of one slider kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Magic {
    pub mask: Bitboard,
    pub magic: u64,
    pub shift: u32,
    /// Start of this square's slice in the shared attack table.
    pub offset: usize,
}

impl Magic {
    /// Index into the shared attack table for the given board occupancy.
    #[inline(always)]
    pub fn index(&self, occupied: Bitboard) -> usize {
        let hashed = (occupied & self.mask).0.wrapping_mul(self.magic) >> self.shift;
        self.offset + hashed as usize
    }
}

/// Rook and bishop magics with their attack tables.
pub struct SliderTables {
    bishop: [Magic; 64],
    rook: [Magic; 64],
    bishop_table: Vec<Bitboard>,
    rook_table: Vec<Bitboard>,
}

impl SliderTables {
    /// Search magics for both slider kinds using the given random source.
    pub fn generate<R: RngCore>(rng: &mut R) -> Self {
        let (bishop, bishop_table) = find_magics(PieceKind::Bishop, rng);
        let (rook, rook_table) = find_magics(PieceKind::Rook, rng);
        Self {
            bishop,
            rook,
            bishop_table,
            rook_table,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::generate(&mut StdRng::seed_from_u64(seed))
    }

    #[inline(always)]
    pub fn bishop_attacks(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        self.bishop_table[self.bishop[sq as usize].index(occupied)]
    }

    #[inline(always)]
    pub fn rook_attacks(&self, sq: u8, occupied: Bitboard) -> Bitboard {
        self.rook_table[self.rook[sq as usize].index(occupied)]
    }

    /// The magic entry for a square. Only bishops and rooks have one.
    pub fn magic(&self, kind: PieceKind, sq: u8) -> &Magic {
        match kind {
            PieceKind::Bishop => &self.bishop[sq as usize],
            PieceKind::Rook => &self.rook[sq as usize],
            _ => panic!("{kind:?} has no magic table"),
        }
    }

    /// Total number of attack sets stored for a slider kind.
    pub fn table_len(&self, kind: PieceKind) -> usize {
        match kind {
            PieceKind::Bishop => self.bishop_table.len(),
            PieceKind::Rook => self.rook_table.len(),
            _ => 0,
        }
    }
}

static TABLES: OnceLock<SliderTables> = OnceLock::new();

/// Build the process-wide slider tables. Calling it more than once is a no-op.
pub fn init() {
    if TABLES.get().is_some() {
        return;
    }
    let start = Instant::now();
    let tables = tables();
    debug!(
        bishop_entries = tables.table_len(PieceKind::Bishop),
        rook_entries = tables.table_len(PieceKind::Rook),
        elapsed = ?start.elapsed(),
        "magic tables ready"
    );
}

/// The process-wide slider tables, built from [`MAGIC_SEED`] on first use.
#[inline(always)]
pub fn tables() -> &'static SliderTables {
    TABLES.get_or_init(|| SliderTables::with_seed(MAGIC_SEED))
}

/// Occupancy squares that can block a slider on `sq`.
///
/// Edge squares never change the attack set (the ray ends there anyway),
/// unless the slider itself stands on that edge line.
pub fn relevant_mask(kind: PieceKind, sq: u8) -> Bitboard {
    let rank_edges = (Bitboard::RANK_1 | Bitboard::RANK_8) & !Bitboard::rank_mask(sq);
    let file_edges = (Bitboard::FILE_A | Bitboard::FILE_H) & !Bitboard::file_mask(sq);
    slider_attacks_slow(kind, sq, Bitboard::EMPTY) & !(rank_edges | file_edges)
}

/// Candidates with few set bits make good magics.
fn sparse_random<R: RngCore>(rng: &mut R) -> u64 {
    rng.next_u64() & rng.next_u64() & rng.next_u64()
}

fn find_magics<R: RngCore>(kind: PieceKind, rng: &mut R) -> ([Magic; 64], Vec<Bitboard>) {
    let mut magics = [Magic::default(); 64];
    let mut table = Vec::new();

    let mut occupancies = Vec::with_capacity(4096);
    let mut reference = Vec::with_capacity(4096);
    // epoch[i] == attempt marks slot i as written during the current attempt,
    // so a failed candidate needs no table wipe.
    let mut epoch = vec![0u32; 4096];
    let mut attempt = 0u32;

    for sq in 0..64u8 {
        let mask = relevant_mask(kind, sq);
        let bits = mask.popcount();

        occupancies.clear();
        reference.clear();
        for subset in mask.subsets() {
            occupancies.push(subset);
            reference.push(slider_attacks_slow(kind, sq, subset));
        }

        let offset = table.len();
        table.resize(offset + (1usize << bits), Bitboard::EMPTY);
        let slots = &mut table[offset..];

        let mut entry = Magic {
            mask,
            magic: 0,
            shift: 64 - bits,
            offset,
        };

        'candidates: loop {
            entry.magic = sparse_random(rng);
            if (entry.magic.wrapping_mul(mask.0) >> 56).count_ones() < 6 {
                continue;
            }

            attempt += 1;
            for (occupancy, attacks) in occupancies.iter().zip(&reference) {
                let idx = (occupancy.0.wrapping_mul(entry.magic) >> entry.shift) as usize;
                if epoch[idx] == attempt {
                    // Sharing a slot is fine only when the attack sets agree.
                    if slots[idx] != *attacks {
                        continue 'candidates;
                    }
                } else {
                    epoch[idx] = attempt;
                    slots[idx] = *attacks;
                }
            }
            break;
        }

        magics[sq as usize] = entry;
    }

    (magics, table)
}

#[cfg(test)]
#[path = "magic_tests.rs"]
mod magic_tests;
