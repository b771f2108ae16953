pub mod attacks;
pub mod bitboard;
pub mod board;
pub mod controller;
pub mod error;
pub mod eval;
pub mod fen;
pub mod magic;
pub mod movegen;
pub mod movelist;
pub mod ordering;
pub mod perft;
pub mod search;
pub mod time_control;
pub mod tt;
pub mod types;
pub mod uci;
pub mod zobrist;

// Re-export core game logic (not engine-specific)
pub use attacks::*;
pub use bitboard::*;
pub use board::*;
pub use controller::{EngineController, EngineState};
pub use error::{ChessError, ChessResult};
pub use eval::{Evaluator, MaterialEvaluator, PIECE_VALUES};
pub use fen::START_FEN;
pub use movegen::*;
pub use movelist::{MAX_MOVES, MoveList};
pub use perft::{perft, perft_divide};
pub use search::{MATE, MAX_PLY, SearchConfig, SearchInfo, Searcher, mate_in};
pub use time_control::*;
pub use tt::{NodeType, TranspositionTable, TtEntry};
pub use types::*;
pub use uci::*;
pub use zobrist::ZOBRIST;

/// Build the process-wide attack tables up front.
///
/// Everything works without calling this (the tables are built on first
/// use), but front ends call it at startup so the first search does not pay
/// for table generation.
pub fn init() {
    magic::init();
}

// =============================================================================
// Engine trait: implemented by every searcher the front end can drive
// =============================================================================

/// Why the root position has no moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Checkmate,
    Stalemate,
}

/// Result of a search operation
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The best move found (None if no legal moves)
    pub best_move: Option<Move>,
    /// Evaluation score in centipawns from the side to move's perspective
    pub score: i32,
    /// Deepest fully completed iteration
    pub depth: u8,
    pub nodes: u64,
    /// Whether the search was cancelled before reaching its depth limit
    pub stopped: bool,
    /// Principal variation of the last completed iteration
    pub pv: Vec<Move>,
    /// Set when the root position is already checkmate or stalemate
    pub terminal: Option<Terminal>,
}

/// Trait that all chess engines must implement.
///
/// The controller and the protocol front end only talk to this trait, so the
/// evaluation behind a search can be swapped freely.
pub trait Engine: Send {
    /// Search the position with the given search limits.
    fn search(&mut self, pos: &Position, limits: SearchLimits) -> SearchResult {
        self.search_with_info(pos, &[], limits, &mut |_| {})
    }

    /// Search with the hashes of the preceding game positions (for
    /// repetition detection), reporting every completed iteration.
    fn search_with_info(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult;

    /// Returns the engine's name for UCI identification
    fn name(&self) -> &str;

    /// Returns the engine's author for UCI identification
    fn author(&self) -> &str {
        "ChessLab"
    }

    /// Reset internal state for a new game (clear hash tables, killers, etc.)
    fn new_game(&mut self) {}

    /// Optional: Set a UCI option. Returns true if the option was recognized.
    fn set_option(&mut self, _name: &str, _value: &str) -> bool {
        false
    }
}
