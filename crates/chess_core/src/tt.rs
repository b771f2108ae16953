//! Transposition table: a fixed-size cache of search results keyed by
//! position hash.

use std::mem::size_of;

use tracing::trace;

use crate::search::MATE_BOUND;
use crate::types::Move;

/// How a stored score relates to the true value of the node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Exact,
    /// The search failed high: the true score is at least `score`.
    LowerBound,
    /// The search failed low: the true score is at most `score`.
    UpperBound,
}

#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub hash: u64,
    pub best_move: Option<Move>,
    pub depth: u8,
    /// Mate scores are stored relative to the node, not the root.
    pub score: i32,
    pub node: NodeType,
}

pub struct TranspositionTable {
    entries: Vec<Option<TtEntry>>,
}

impl TranspositionTable {
    /// A table using about `megabytes` MiB, holding at least one entry.
    pub fn new(megabytes: usize) -> Self {
        Self {
            entries: vec![None; Self::capacity_for(megabytes)],
        }
    }

    fn capacity_for(megabytes: usize) -> usize {
        (megabytes.saturating_mul(1 << 20) / size_of::<Option<TtEntry>>()).max(1)
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    fn index(&self, hash: u64) -> usize {
        (hash % self.entries.len() as u64) as usize
    }

    /// The entry stored for exactly this hash, if any.
    #[inline]
    pub fn probe(&self, hash: u64) -> Option<&TtEntry> {
        self.entries[self.index(hash)]
            .as_ref()
            .filter(|e| e.hash == hash)
    }

    /// Store a result. A slot holding the same position is only overwritten
    /// by a search at least as deep; any other occupant is always replaced.
    pub fn store(
        &mut self,
        hash: u64,
        best_move: Option<Move>,
        depth: u8,
        score: i32,
        node: NodeType,
    ) {
        let idx = self.index(hash);
        let slot = &mut self.entries[idx];
        if let Some(existing) = slot
            && existing.hash == hash
            && depth < existing.depth
        {
            return;
        }
        *slot = Some(TtEntry {
            hash,
            best_move,
            depth,
            score,
            node,
        });
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    /// Reallocate for a new size. The contents are discarded.
    pub fn resize(&mut self, megabytes: usize) {
        let capacity = Self::capacity_for(megabytes);
        trace!(megabytes, capacity, "resizing transposition table");
        self.entries = vec![None; capacity];
    }

    /// Occupancy in per-mille, sampled over the first thousand slots.
    pub fn hashfull(&self) -> u32 {
        let sample = self.entries.len().min(1000);
        let used = self.entries[..sample].iter().filter(|e| e.is_some()).count();
        (used * 1000 / sample) as u32
    }
}

/// Convert a root-relative mate score to node-relative before storing.
#[inline]
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score + ply as i32
    } else if score <= -MATE_BOUND {
        score - ply as i32
    } else {
        score
    }
}

/// Convert a stored node-relative mate score back to root-relative.
#[inline]
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score >= MATE_BOUND {
        score - ply as i32
    } else if score <= -MATE_BOUND {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
#[path = "tt_tests.rs"]
mod tt_tests;
