use std::time::Duration;

use super::*;
use crate::eval::MaterialEvaluator;
use crate::movegen::legal_moves;
use crate::time_control::Deadline;
use crate::types::Color;

fn searcher() -> Searcher<MaterialEvaluator> {
    Searcher::new(MaterialEvaluator, 4)
}

fn best(fen: &str, depth: u8) -> SearchResult {
    let pos = Position::from_fen(fen).unwrap();
    searcher().search(&pos, &[], &SearchLimits::depth(depth), |_| {})
}

#[test]
fn test_finds_back_rank_mate() {
    let result = best("6k1/5ppp/8/8/8/8/5PPP/4Q1K1 w - - 0 1", 3);
    assert_eq!(result.best_move.unwrap().to_string(), "e1e8");
    assert_eq!(result.score, MATE - 1);
    assert_eq!(mate_in(result.score), Some(1));
    assert_eq!(result.terminal, None);
}

#[test]
fn test_wins_hanging_queen() {
    let result = best("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", 4);
    assert_eq!(result.best_move.unwrap().to_string(), "d1d5");
    assert!(result.score > 300, "score {}", result.score);
}

#[test]
fn test_same_answer_without_tt() {
    for (fen, expected) in [
        ("6k1/5ppp/8/8/8/8/5PPP/4Q1K1 w - - 0 1", "e1e8"),
        ("4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1", "d1d5"),
    ] {
        let pos = Position::from_fen(fen).unwrap();
        let mut plain = searcher().with_config(SearchConfig {
            use_tt: false,
            null_move: true,
        });
        let result = plain.search(&pos, &[], &SearchLimits::depth(4), |_| {});
        assert_eq!(result.best_move.unwrap().to_string(), expected, "{fen}");
    }
}

#[test]
fn test_search_is_deterministic() {
    let pos = Position::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    )
    .unwrap();
    let a = searcher().search(&pos, &[], &SearchLimits::depth(5), |_| {});
    let b = searcher().search(&pos, &[], &SearchLimits::depth(5), |_| {});
    assert_eq!(a.best_move, b.best_move);
    assert_eq!(a.score, b.score);
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.pv, b.pv);
}

#[test]
fn test_reports_each_completed_depth() {
    let pos = Position::startpos();
    let mut depths = Vec::new();
    let result = searcher().search(&pos, &[], &SearchLimits::depth(4), |info| {
        assert!(!info.pv.is_empty());
        depths.push(info.depth);
    });
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert_eq!(result.depth, 4);
    assert!(!result.stopped);

    let legal = legal_moves(&pos);
    assert!(legal.contains(result.best_move.unwrap()));
    assert_eq!(result.pv.first().copied(), result.best_move);
}

#[test]
fn test_checkmated_root_reports_terminal() {
    let result = best(
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        4,
    );
    assert_eq!(result.best_move, None);
    assert_eq!(result.terminal, Some(Terminal::Checkmate));
    assert_eq!(result.score, -MATE);
}

#[test]
fn test_stalemated_root_reports_terminal() {
    let result = best("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 4);
    assert_eq!(result.best_move, None);
    assert_eq!(result.terminal, Some(Terminal::Stalemate));
    assert_eq!(result.score, 0);
}

#[test]
fn test_pre_cancelled_search_returns_first_legal_move() {
    let pos = Position::startpos();
    let cancel = CancelToken::new();
    cancel.cancel();
    let limits = SearchLimits::infinite().with_cancel(cancel);

    let result = searcher().search(&pos, &[], &limits, |_| panic!("no iteration should complete"));
    assert!(result.stopped);
    assert_eq!(result.depth, 0);
    assert_eq!(result.best_move, legal_moves(&pos).get(0));
}

#[test]
fn test_deadline_stops_infinite_search() {
    let pos = Position::startpos();
    let before = pos.clone();
    let cancel = CancelToken::new();
    let limits = SearchLimits::infinite().with_cancel(cancel.clone());

    let _deadline = Deadline::arm(cancel, Duration::from_millis(100));
    let result = searcher().search(&pos, &[], &limits, |_| {});

    assert!(result.stopped);
    assert!(legal_moves(&pos).contains(result.best_move.unwrap()));
    assert_eq!(pos, before);
}

#[test]
fn test_repetition_counts_game_history() {
    let mut pos = Position::startpos();
    let mut history = Vec::new();
    for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = legal_moves(&pos)
            .iter()
            .copied()
            .find(|m| m.to_string() == text)
            .unwrap();
        history.push(pos.position_hash());
        pos.make_move(mv);
    }
    assert_eq!(pos.position_hash(), Position::startpos().position_hash());

    let mut s = searcher();
    s.history = history.clone();
    assert!(s.is_repetition(&pos));

    // A pawn move since then puts the earlier occurrence out of reach.
    let mut reset = pos.clone();
    reset.set_state(Color::White, reset.castling(), None, 0, 3);
    assert!(!s.is_repetition(&reset));

    s.history = history[2..].to_vec();
    assert!(!s.is_repetition(&pos));
}

#[test]
fn test_mate_in_conversion() {
    assert_eq!(mate_in(MATE - 1), Some(1));
    assert_eq!(mate_in(MATE - 3), Some(2));
    assert_eq!(mate_in(-MATE + 2), Some(-1));
    assert_eq!(mate_in(-MATE + 4), Some(-2));
    assert_eq!(mate_in(250), None);
    assert_eq!(mate_in(-250), None);
}

#[test]
fn test_new_game_clears_table() {
    let pos = Position::startpos();
    let mut s = searcher();
    s.search(&pos, &[], &SearchLimits::depth(3), |_| {});
    assert!(s.tt().probe(pos.position_hash()).is_some());
    s.new_game();
    assert_eq!(s.tt().hashfull(), 0);
    assert!(s.tt().probe(pos.position_hash()).is_none());
}

#[test]
fn test_quiescence_skips_losing_captures() {
    // Qxd5 drops the queen to cxd5, so the stand-pat score stands and no
    // child node is visited.
    let mut pos = Position::from_fen("4k3/8/2p5/3p4/8/8/8/3QK3 w - - 0 1").unwrap();
    let mut s = searcher();
    assert_eq!(s.quiescence(&mut pos, -INFINITY, INFINITY, 0), 700);
    assert_eq!(s.nodes, 1);
}

#[test]
fn test_quiescence_skips_captures_that_cannot_reach_alpha() {
    let fen = "4k3/8/8/3p4/8/8/8/3QK3 w - - 0 1";

    // Stand pat is 800. Winning the pawn cannot lift it past 1200.
    let mut pos = Position::from_fen(fen).unwrap();
    let mut s = searcher();
    assert_eq!(s.quiescence(&mut pos, 1200, 2000, 0), 1200);
    assert_eq!(s.nodes, 1);

    // Within the margin the capture is played out.
    let mut s = searcher();
    assert_eq!(s.quiescence(&mut pos, 850, 2000, 0), 900);
    assert!(s.nodes > 1);
}

#[test]
fn test_insufficient_material_scores_as_draw() {
    // A lone knight cannot mate, whatever the material count says.
    let result = best("8/8/8/4k3/8/4KN2/8/8 w - - 0 1", 3);
    assert_eq!(result.score, 0);

    let result = best("8/8/8/4k3/8/4KR2/8/8 w - - 0 1", 3);
    assert!(result.score >= 500, "score {}", result.score);
}
