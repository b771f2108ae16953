use super::*;
use chess_core::{Color, EngineController, Terminal, legal_moves};

fn engine() -> ClassicalEngine {
    ClassicalEngine::with_hash(1)
}

#[test]
fn test_finds_mate_in_one() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/4Q1K1 w - - 0 1").unwrap();
    let result = engine().search(&pos, SearchLimits::depth(3));
    assert_eq!(result.best_move.unwrap().to_string(), "e1e8");
    assert_eq!(chess_core::mate_in(result.score), Some(1));
}

#[test]
fn test_takes_free_piece() {
    let pos = Position::from_fen("rnbqkb1r/pppppppp/8/3n4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 1 2")
        .unwrap();
    let result = engine().search(&pos, SearchLimits::depth(4));
    assert_eq!(result.best_move.unwrap().to_string(), "e4d5");
}

#[test]
fn test_startpos_move_is_legal_and_reported() {
    let pos = Position::startpos();
    let mut depths = Vec::new();
    let result = engine().search_with_info(&pos, &[], SearchLimits::depth(4), &mut |info| {
        depths.push(info.depth)
    });
    assert_eq!(depths, vec![1, 2, 3, 4]);
    assert!(legal_moves(&pos).contains(result.best_move.unwrap()));
    assert!(result.score.abs() < 100, "score {}", result.score);
}

#[test]
fn test_terminal_root() {
    let stalemate = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    let result = engine().search(&stalemate, SearchLimits::depth(2));
    assert_eq!(result.terminal, Some(Terminal::Stalemate));
    assert_eq!(result.best_move, None);
}

#[test]
fn test_options() {
    let mut engine = engine();
    assert!(engine.set_option("Hash", "2"));
    assert!(!engine.set_option("Hash", "zero"));

    assert!(engine.set_option("NullMove", "false"));
    assert!(!engine.config().null_move);
    assert!(!engine.set_option("NullMove", "maybe"));

    assert!(engine.set_option("Contempt", "25"));
    assert_eq!(engine.contempt(), 25);

    assert!(!engine.set_option("Ponder", "true"));
}

#[test]
fn test_null_move_does_not_change_tactics() {
    let pos = Position::from_fen("6k1/5ppp/8/8/8/8/5PPP/4Q1K1 w - - 0 1").unwrap();
    let mut plain = engine();
    plain.set_option("NullMove", "false");
    let result = plain.search(&pos, SearchLimits::depth(3));
    assert_eq!(result.best_move.unwrap().to_string(), "e1e8");
}

#[test]
fn test_runs_under_controller() {
    let controller = EngineController::new(engine());
    let (name, _) = controller.identity();
    assert_eq!(name, "Classical v2.0");

    controller
        .set_position(Position::startpos(), Vec::new())
        .unwrap();
    let (tx, rx) = std::sync::mpsc::channel();
    controller
        .start(SearchLimits::depth(3), |_| {}, move |result| {
            let _ = tx.send(result);
        })
        .unwrap();
    let result = rx
        .recv_timeout(std::time::Duration::from_secs(30))
        .unwrap();
    assert!(result.best_move.is_some());
}

#[test]
fn test_hash_survives_same_side_searches_only() {
    let start = Position::startpos();
    let mut engine = engine();
    engine.search(&start, SearchLimits::depth(3));
    let stored = |engine: &ClassicalEngine| {
        engine.searcher.tt().probe(start.position_hash()).is_some()
    };
    assert!(stored(&engine));

    // Still White at the root: the table is reused.
    let white = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    engine.search(&white, SearchLimits::depth(1));
    assert!(stored(&engine));
    assert_eq!(engine.searcher.evaluator().root_side, Color::White);

    // Contempt now favors the other side, so old draw scores are stale.
    let black = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 b - - 0 1").unwrap();
    engine.search(&black, SearchLimits::depth(1));
    assert!(!stored(&engine));
    assert_eq!(engine.searcher.evaluator().root_side, Color::Black);
}

#[test]
fn test_contempt_change_clears_hash() {
    let start = Position::startpos();
    let mut engine = engine();
    engine.search(&start, SearchLimits::depth(3));

    let stored = |engine: &ClassicalEngine| {
        engine.searcher.tt().probe(start.position_hash()).is_some()
    };

    assert!(engine.set_option("Contempt", &DEFAULT_CONTEMPT.to_string()));
    assert!(stored(&engine));

    assert!(engine.set_option("Contempt", "0"));
    assert!(!stored(&engine));
}
