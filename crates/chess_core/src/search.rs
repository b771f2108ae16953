//! Iterative-deepening principal-variation search.
//!
//! Negamax alpha-beta with a transposition table, null-move pruning, check
//! extensions, mate-distance pruning and a capture-only quiescence search
//! at the horizon. The search owns one mutable [`Position`] and restores it
//! with undo records, so cancellation at any node leaves the caller's
//! position untouched.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::board::{Position, Undo};
use crate::eval::{Evaluator, PIECE_VALUES};
use crate::movegen::{legal_moves_into, pseudo_captures, pseudo_moves};
use crate::movelist::MoveList;
use crate::ordering::{Killers, captured_kind, score_captures, score_moves, see};
use crate::time_control::{CancelToken, SearchLimits};
use crate::tt::{NodeType, TranspositionTable, score_from_tt, score_to_tt};
use crate::types::{Move, MoveKind};
use crate::{Engine, SearchResult, Terminal};

/// Score of delivering mate on the spot. Mate in `n` plies scores `MATE - n`.
pub const MATE: i32 = 100_000;
pub const INFINITY: i32 = MATE + 1;
/// Deepest ply the search ever reaches, extensions and quiescence included.
pub const MAX_PLY: usize = 128;
/// Scores at least this far from zero are forced mates.
pub const MATE_BOUND: i32 = MATE - MAX_PLY as i32;
/// Nodes between two looks at the cancellation token.
pub const NODE_POLL_INTERVAL: u64 = 2048;

const ASPIRATION_WINDOW: i32 = 50;
/// Slack added to a capture's gain before quiescence writes it off.
const DELTA_MARGIN: i32 = 200;

/// Moves until mate (positive when the side to move mates), if `score`
/// is a mate score.
pub fn mate_in(score: i32) -> Option<i32> {
    if score >= MATE_BOUND {
        Some((MATE - score + 1) / 2)
    } else if score <= -MATE_BOUND {
        Some(-(MATE + score) / 2)
    } else {
        None
    }
}

/// Feature switches, mainly for tests and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Probe and store the transposition table.
    pub use_tt: bool,
    pub null_move: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_tt: true,
            null_move: true,
        }
    }
}

/// Progress report for one completed iteration.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    pub depth: u8,
    pub seldepth: u8,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Transposition table fill in permille.
    pub hashfull: u32,
    pub pv: Vec<Move>,
}

pub struct Searcher<E: Evaluator> {
    evaluator: E,
    tt: TranspositionTable,
    killers: Killers,
    config: SearchConfig,

    /// One move buffer per ply.
    lists: Vec<MoveList>,
    /// Undo record of the move currently made at each ply.
    undos: Vec<Undo>,
    /// Hashes of the game before the root followed by the current search path.
    history: Vec<u64>,
    /// Triangular PV table: row `ply` holds the line found below that ply.
    pv_table: Vec<[Move; MAX_PLY]>,
    pv_len: [usize; MAX_PLY],
    /// PV of the last completed iteration, tried first at each ply.
    prev_pv: Vec<Move>,

    nodes: u64,
    seldepth: usize,
    cancel: CancelToken,
    stopped: bool,
}

impl<E: Evaluator> Searcher<E> {
    pub fn new(evaluator: E, hash_mb: usize) -> Self {
        Self {
            evaluator,
            tt: TranspositionTable::new(hash_mb),
            killers: Killers::new(),
            config: SearchConfig::default(),
            lists: vec![MoveList::new(); MAX_PLY],
            undos: vec![Undo::default(); MAX_PLY],
            history: Vec::with_capacity(1024),
            pv_table: vec![[Move::NULL; MAX_PLY]; MAX_PLY],
            pv_len: [0; MAX_PLY],
            prev_pv: Vec::with_capacity(MAX_PLY),
            nodes: 0,
            seldepth: 0,
            cancel: CancelToken::new(),
            stopped: false,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        self.config = config;
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_mut(&mut self) -> &mut E {
        &mut self.evaluator
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn resize_tt(&mut self, megabytes: usize) {
        self.tt.resize(megabytes);
    }

    /// Forget everything learned in previous searches.
    pub fn clear(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.prev_pv.clear();
    }

    /// Search `pos` within `limits`.
    ///
    /// `game_history` holds the hashes of the positions played before `pos`,
    /// oldest first; they count for repetition detection. `on_info` is
    /// called after every completed iteration.
    pub fn search(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: &SearchLimits,
        mut on_info: impl FnMut(&SearchInfo),
    ) -> SearchResult {
        let start = Instant::now();
        let mut root = pos.clone();

        self.nodes = 0;
        self.seldepth = 0;
        self.stopped = false;
        self.cancel = limits.cancel.clone();
        self.killers.clear();
        self.prev_pv.clear();
        self.history.clear();
        self.history.extend_from_slice(game_history);

        let mut root_moves = MoveList::new();
        legal_moves_into(&mut root, &mut root_moves);
        let Some(first) = root_moves.get(0) else {
            let (terminal, score) = if root.in_check(root.side_to_move()) {
                (Terminal::Checkmate, -MATE)
            } else {
                (Terminal::Stalemate, self.evaluator.draw_score(&root))
            };
            return SearchResult {
                best_move: None,
                score,
                depth: 0,
                nodes: 0,
                stopped: false,
                pv: Vec::new(),
                terminal: Some(terminal),
            };
        };

        // Reported if cancelled before the first iteration completes.
        let mut result = SearchResult {
            best_move: Some(first),
            score: 0,
            depth: 0,
            nodes: 0,
            stopped: false,
            pv: vec![first],
            terminal: None,
        };

        let max_depth = limits.depth.clamp(1, (MAX_PLY - 1) as u8);
        let (mut alpha, mut beta) = (-INFINITY, INFINITY);
        let mut depth = 1u8;

        while depth <= max_depth {
            if self.cancel.is_cancelled() {
                self.stopped = true;
                break;
            }

            let score = self.negamax(&mut root, alpha, beta, depth as i32, 0, true);
            if self.stopped {
                break;
            }

            let full_window = alpha == -INFINITY && beta == INFINITY;
            if !full_window && (score <= alpha || score >= beta) {
                debug!(depth, alpha, beta, score, "aspiration window missed, re-searching");
                alpha = -INFINITY;
                beta = INFINITY;
                continue;
            }

            let pv: Vec<Move> = self.pv_table[0][..self.pv_len[0]].to_vec();
            let info = SearchInfo {
                depth,
                seldepth: self.seldepth.min(u8::MAX as usize) as u8,
                score,
                nodes: self.nodes,
                elapsed: start.elapsed(),
                hashfull: self.tt.hashfull(),
                pv: pv.clone(),
            };
            debug!(
                depth = info.depth,
                seldepth = info.seldepth,
                score = info.score,
                nodes = info.nodes,
                elapsed_ms = info.elapsed.as_millis() as u64,
                "iteration complete"
            );
            on_info(&info);

            result.best_move = pv.first().copied().or(result.best_move);
            result.score = score;
            result.depth = depth;
            result.pv = pv.clone();
            self.prev_pv = pv;

            alpha = score - ASPIRATION_WINDOW;
            beta = score + ASPIRATION_WINDOW;
            depth += 1;
        }

        result.nodes = self.nodes;
        result.stopped = self.stopped;
        result
    }

    /// Count a node and look at the cancellation token every
    /// `NODE_POLL_INTERVAL` nodes. Returns true once the search must unwind.
    #[inline(always)]
    fn tick(&mut self) -> bool {
        self.nodes += 1;
        if self.nodes.is_multiple_of(NODE_POLL_INTERVAL) && self.cancel.is_cancelled() {
            self.stopped = true;
        }
        self.stopped
    }

    /// A position with the same hash occurred earlier with the same side to
    /// move and no irreversible move in between.
    fn is_repetition(&self, pos: &Position) -> bool {
        let hash = pos.position_hash();
        self.history
            .iter()
            .rev()
            .take(pos.halfmove_clock() as usize)
            .skip(1)
            .step_by(2)
            .any(|&h| h == hash)
    }

    fn update_pv(&mut self, ply: usize, mv: Move) {
        let child_len = self.pv_len[ply + 1].max(ply + 1);
        let (upper, lower) = self.pv_table.split_at_mut(ply + 1);
        upper[ply][ply] = mv;
        upper[ply][ply + 1..child_len].copy_from_slice(&lower[0][ply + 1..child_len]);
        self.pv_len[ply] = child_len;
    }

    fn negamax(
        &mut self,
        pos: &mut Position,
        mut alpha: i32,
        mut beta: i32,
        mut depth: i32,
        ply: usize,
        can_null: bool,
    ) -> i32 {
        self.pv_len[ply] = ply;
        if self.stopped {
            return 0;
        }

        let is_root = ply == 0;
        let pv_node = beta - alpha > 1;

        if !is_root {
            alpha = alpha.max(-MATE + ply as i32);
            beta = beta.min(MATE - ply as i32 - 1);
            if alpha >= beta {
                return alpha;
            }
        }

        if !is_root
            && (pos.is_fifty_move_draw()
                || pos.is_insufficient_material()
                || self.is_repetition(pos))
        {
            return self.evaluator.draw_score(pos);
        }

        let us = pos.side_to_move();
        let in_check = pos.in_check(us);
        if in_check {
            depth += 1;
        }

        if depth <= 0 {
            return self.quiescence(pos, alpha, beta, ply);
        }

        if self.tick() {
            return 0;
        }
        self.seldepth = self.seldepth.max(ply);
        if ply >= MAX_PLY - 1 {
            return self.evaluator.evaluate(pos);
        }

        let hash = pos.position_hash();
        let mut tt_move = None;
        if !is_root
            && self.config.use_tt
            && let Some(entry) = self.tt.probe(hash)
        {
            tt_move = entry.best_move;
            if entry.depth as i32 >= depth {
                let score = score_from_tt(entry.score, ply);
                match entry.node {
                    NodeType::Exact => return score.clamp(alpha, beta),
                    NodeType::LowerBound => {
                        if score >= beta {
                            return beta;
                        }
                        alpha = alpha.max(score);
                    }
                    NodeType::UpperBound => {
                        if score <= alpha {
                            return alpha;
                        }
                        beta = beta.min(score);
                    }
                }
            }
        }

        if self.config.null_move
            && can_null
            && !pv_node
            && !in_check
            && depth >= 3
            && pos.has_non_pawn_material(us)
            && self.evaluator.evaluate(pos) >= beta
        {
            let reduction = if depth > 6 { 3 } else { 2 };
            self.history.push(hash);
            let undo = pos.make_null_move();
            let score = -self.negamax(pos, -beta, -beta + 1, depth - 1 - reduction, ply + 1, false);
            pos.unmake_null_move(&undo);
            self.history.pop();
            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
        }

        pseudo_moves(pos, &mut self.lists[ply]);
        let pv_move = self.prev_pv.get(ply).copied();
        let killers = self.killers.get(ply);
        score_moves(pos, &mut self.lists[ply], pv_move, tt_move, killers);

        let original_alpha = alpha;
        let mut best_move = None;
        let mut legal = 0u32;

        for i in 0..self.lists[ply].len() {
            let mv = self.lists[ply].pick_best(i);
            self.undos[ply] = pos.make_move(mv);
            if !pos.is_legal() {
                pos.unmake_move(mv, &self.undos[ply]);
                continue;
            }
            legal += 1;

            self.history.push(hash);
            let score = if legal == 1 {
                -self.negamax(pos, -beta, -alpha, depth - 1, ply + 1, true)
            } else {
                let probe = -self.negamax(pos, -alpha - 1, -alpha, depth - 1, ply + 1, true);
                if probe > alpha && probe < beta {
                    -self.negamax(pos, -beta, -alpha, depth - 1, ply + 1, true)
                } else {
                    probe
                }
            };
            self.history.pop();
            pos.unmake_move(mv, &self.undos[ply]);

            if self.stopped {
                return 0;
            }

            if score >= beta {
                if self.config.use_tt {
                    self.tt.store(
                        hash,
                        Some(mv),
                        depth_to_u8(depth),
                        score_to_tt(beta, ply),
                        NodeType::LowerBound,
                    );
                }
                if captured_kind(pos, mv).is_none() && mv.promotion().is_none() {
                    self.killers.store(ply, mv);
                }
                return beta;
            }

            if score > alpha {
                alpha = score;
                best_move = Some(mv);
                self.update_pv(ply, mv);
            }
        }

        if legal == 0 {
            return if in_check {
                -MATE + ply as i32
            } else {
                self.evaluator.draw_score(pos)
            };
        }

        if self.config.use_tt {
            let node = if alpha > original_alpha {
                NodeType::Exact
            } else {
                NodeType::UpperBound
            };
            self.tt.store(
                hash,
                best_move,
                depth_to_u8(depth),
                score_to_tt(alpha, ply),
                node,
            );
        }
        alpha
    }

    fn quiescence(&mut self, pos: &mut Position, mut alpha: i32, beta: i32, ply: usize) -> i32 {
        self.pv_len[ply] = ply;
        if self.tick() {
            return 0;
        }
        self.seldepth = self.seldepth.max(ply);

        if pos.is_insufficient_material() {
            return self.evaluator.draw_score(pos);
        }
        let stand_pat = self.evaluator.evaluate(pos);
        if ply >= MAX_PLY - 1 {
            return stand_pat;
        }
        if stand_pat >= beta {
            return beta;
        }
        alpha = alpha.max(stand_pat);

        pseudo_captures(pos, &mut self.lists[ply]);
        score_captures(pos, &mut self.lists[ply]);

        let endgame = self.evaluator.is_endgame(pos);
        for i in 0..self.lists[ply].len() {
            let mv = self.lists[ply].pick_best(i);
            if mv.kind == MoveKind::Normal
                && let Some(victim) = captured_kind(pos, mv)
            {
                if !endgame && stand_pat + PIECE_VALUES[victim.idx()] + DELTA_MARGIN < alpha {
                    continue;
                }
                if see(pos, mv) < 0 {
                    continue;
                }
            }

            self.undos[ply] = pos.make_move(mv);
            if !pos.is_legal() {
                pos.unmake_move(mv, &self.undos[ply]);
                continue;
            }
            let score = -self.quiescence(pos, -beta, -alpha, ply + 1);
            pos.unmake_move(mv, &self.undos[ply]);

            if self.stopped {
                return 0;
            }
            if score >= beta {
                return beta;
            }
            alpha = alpha.max(score);
        }
        alpha
    }
}

#[inline]
fn depth_to_u8(depth: i32) -> u8 {
    depth.clamp(0, u8::MAX as i32) as u8
}

impl<E: Evaluator> Engine for Searcher<E> {
    fn search_with_info(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult {
        self.search(pos, game_history, &limits, on_info)
    }

    fn name(&self) -> &str {
        "chess_core searcher"
    }

    fn new_game(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod search_tests;
