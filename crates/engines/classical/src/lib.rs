//! Classical Chess Engine
//!
//! The core principal-variation search driven by a hand-written evaluation:
//! material, piece-square tables tapered by game phase, and a contempt
//! factor that steers away from early draws.

mod eval;

use chess_core::{Engine, Position, SearchConfig, SearchInfo, SearchLimits, SearchResult, Searcher};
use tracing::debug;

pub use eval::{ClassicalEvaluator, DEFAULT_CONTEMPT, game_phase, is_endgame};

/// Transposition table size used when nothing else is configured.
pub const DEFAULT_HASH_MB: usize = 16;

/// Classical chess engine: iterative-deepening PVS with a classical
/// evaluation.
///
/// Recognized options: `Hash` (MB), `NullMove` (true/false) and
/// `Contempt` (centipawns).
pub struct ClassicalEngine {
    searcher: Searcher<ClassicalEvaluator>,
}

impl ClassicalEngine {
    pub fn new() -> Self {
        Self::with_hash(DEFAULT_HASH_MB)
    }

    pub fn with_hash(megabytes: usize) -> Self {
        Self {
            searcher: Searcher::new(ClassicalEvaluator::default(), megabytes),
        }
    }

    pub fn config(&self) -> SearchConfig {
        self.searcher.config()
    }

    pub fn contempt(&self) -> i32 {
        self.searcher.evaluator().contempt
    }
}

impl Default for ClassicalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ClassicalEngine {
    fn search_with_info(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult {
        let side = pos.side_to_move();
        if self.searcher.evaluator().root_side != side {
            // Stored draw scores carry the old side's contempt.
            debug!(?side, "root side changed, clearing hash");
            self.searcher.evaluator_mut().root_side = side;
            self.searcher.clear();
        }
        self.searcher.search(pos, game_history, &limits, on_info)
    }

    fn name(&self) -> &str {
        "Classical v2.0"
    }

    fn new_game(&mut self) {
        self.searcher.clear();
    }

    fn set_option(&mut self, name: &str, value: &str) -> bool {
        let value = value.trim();
        match name.to_ascii_lowercase().as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(mb) if mb > 0 => {
                    self.searcher.resize_tt(mb);
                    true
                }
                _ => false,
            },
            "nullmove" => match value.parse::<bool>() {
                Ok(enabled) => {
                    let mut config = self.searcher.config();
                    config.null_move = enabled;
                    self.searcher.set_config(config);
                    true
                }
                Err(_) => false,
            },
            "contempt" => match value.parse::<i32>() {
                Ok(cp) => {
                    if cp != self.contempt() {
                        self.searcher.evaluator_mut().contempt = cp;
                        self.searcher.clear();
                    }
                    true
                }
                Err(_) => false,
            },
            _ => {
                debug!(name, value, "unknown option");
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod engine_tests;
