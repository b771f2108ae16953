use std::sync::mpsc;
use std::time::Duration;

use super::*;
use crate::eval::MaterialEvaluator;
use crate::movegen::legal_moves;
use crate::search::Searcher;

fn controller() -> EngineController<Searcher<MaterialEvaluator>> {
    EngineController::new(Searcher::new(MaterialEvaluator, 1))
}

fn run(ctl: &EngineController<Searcher<MaterialEvaluator>>, limits: SearchLimits) -> SearchResult {
    let (tx, rx) = mpsc::channel();
    ctl.start(limits, |_| {}, move |result| {
        let _ = tx.send(result);
    })
    .unwrap();
    rx.recv_timeout(Duration::from_secs(30)).unwrap()
}

#[test]
fn test_start_without_position_fails() {
    let ctl = controller();
    assert_eq!(ctl.state(), EngineState::Idle);
    let err = ctl.start(SearchLimits::depth(1), |_| {}, |_| {}).unwrap_err();
    assert_eq!(err, ChessError::NoPosition);
}

#[test]
fn test_search_round_trip() {
    let ctl = controller();
    let pos = Position::startpos();
    ctl.set_position(pos.clone(), Vec::new()).unwrap();
    assert_eq!(ctl.state(), EngineState::PositionSet);

    let (info_tx, info_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    ctl.start(
        SearchLimits::depth(3),
        move |info| {
            let _ = info_tx.send(info.depth);
        },
        move |result| {
            let _ = done_tx.send(result);
        },
    )
    .unwrap();

    let result = done_rx.recv_timeout(Duration::from_secs(30)).unwrap();
    ctl.wait();
    assert_eq!(info_rx.try_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(result.depth, 3);
    assert!(legal_moves(&pos).contains(result.best_move.unwrap()));
    assert_eq!(ctl.state(), EngineState::PositionSet);
    assert_eq!(ctl.position(), Some(pos));
}

#[test]
fn test_running_search_rejects_changes() {
    let ctl = controller();
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();

    let (tx, rx) = mpsc::channel();
    ctl.start(SearchLimits::infinite(), |_| {}, move |result| {
        let _ = tx.send(result);
    })
    .unwrap();
    assert!(ctl.is_running());

    assert_eq!(
        ctl.set_position(Position::startpos(), Vec::new()),
        Err(ChessError::SearchRunning)
    );
    assert_eq!(ctl.new_game(), Err(ChessError::SearchRunning));
    assert_eq!(ctl.set_option("Hash", "8"), Err(ChessError::SearchRunning));
    assert_eq!(
        ctl.start(SearchLimits::depth(1), |_| {}, |_| {}).unwrap_err(),
        ChessError::SearchRunning
    );

    std::thread::sleep(Duration::from_millis(50));
    ctl.stop();
    let result = rx.recv_timeout(Duration::from_secs(30)).unwrap();
    ctl.wait();
    assert!(result.stopped);
    assert!(result.best_move.is_some());
    assert_eq!(ctl.state(), EngineState::PositionSet);
}

#[test]
fn test_move_time_ends_search() {
    let ctl = controller();
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();
    let result = run(&ctl, SearchLimits::time(Duration::from_millis(100)));
    assert!(result.stopped);
    assert!(result.best_move.is_some());
}

#[test]
fn test_new_game_returns_to_idle() {
    let ctl = controller();
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();
    run(&ctl, SearchLimits::depth(2));
    ctl.wait();

    ctl.new_game().unwrap();
    assert_eq!(ctl.state(), EngineState::Idle);
    assert_eq!(ctl.position(), None);
}

#[test]
fn test_terminal_position_reports_no_move() {
    let ctl = controller();
    let mate = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
        .unwrap();
    ctl.set_position(mate, Vec::new()).unwrap();
    let result = run(&ctl, SearchLimits::depth(3));
    assert_eq!(result.best_move, None);
    assert_eq!(result.terminal, Some(crate::Terminal::Checkmate));
}

#[test]
fn test_drop_cancels_running_search() {
    let ctl = controller();
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();
    ctl.start(SearchLimits::infinite(), |_| {}, |_| {}).unwrap();
    drop(ctl);
}

/// Panics on its first search, then defers to a real searcher.
struct FlakyEngine {
    panicked: bool,
    inner: Searcher<MaterialEvaluator>,
}

impl Engine for FlakyEngine {
    fn search_with_info(
        &mut self,
        pos: &Position,
        game_history: &[u64],
        limits: SearchLimits,
        on_info: &mut dyn FnMut(&SearchInfo),
    ) -> SearchResult {
        if !self.panicked {
            self.panicked = true;
            panic!("engine failure");
        }
        self.inner.search_with_info(pos, game_history, limits, on_info)
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

#[test]
fn test_panicking_search_does_not_wedge_controller() {
    let ctl = EngineController::new(FlakyEngine {
        panicked: false,
        inner: Searcher::new(MaterialEvaluator, 1),
    });
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();

    ctl.start(SearchLimits::depth(2), |_| {}, |_| {}).unwrap();
    ctl.wait();
    assert_eq!(ctl.state(), EngineState::PositionSet);

    // The next command is accepted and the next search completes.
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();
    let (tx, rx) = mpsc::channel();
    ctl.start(SearchLimits::depth(2), |_| {}, move |result| {
        let _ = tx.send(result);
    })
    .unwrap();
    let result = rx.recv_timeout(Duration::from_secs(30)).unwrap();
    assert!(result.best_move.is_some());
}

#[test]
fn test_identity_is_available_during_search() {
    let ctl = controller();
    ctl.set_position(Position::startpos(), Vec::new()).unwrap();
    ctl.start(SearchLimits::infinite(), |_| {}, |_| {}).unwrap();

    // The worker holds the engine lock; the handshake must not wait for it.
    let (tx, rx) = mpsc::channel();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            let _ = tx.send(ctl.identity());
        });
        let (name, author) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name, "chess_core searcher");
        assert_eq!(author, "ChessLab");
        ctl.stop();
    });
    ctl.wait();
}
