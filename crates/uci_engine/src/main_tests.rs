use super::*;

#[test]
fn test_parse_setoption() {
    assert_eq!(
        parse_setoption(&["name", "Hash", "value", "32"]),
        Some(("Hash".to_string(), "32".to_string()))
    );
    assert_eq!(
        parse_setoption(&["name", "Clear", "Hash"]),
        Some(("Clear Hash".to_string(), String::new()))
    );
    assert_eq!(parse_setoption(&["value", "3"]), None);
    assert_eq!(parse_setoption(&["name", "value", "3"]), None);
}

#[test]
fn test_session_position_and_depth() {
    let mut session = Session::new(EngineConfig::default());

    assert!(session.handle(&["position", "startpos", "moves", "e2e4"]));
    assert_eq!(
        session.position.to_fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    );

    // A bad move leaves the previous position in place.
    assert!(session.handle(&["position", "startpos", "moves", "e2e5"]));
    assert_eq!(
        session.position.to_fen(),
        "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1"
    );
    assert_eq!(session.controller.position(), Some(session.position.clone()));

    session.handle(&["setoption", "name", "Depth", "value", "5"]);
    assert_eq!(session.depth_cap, 5);
    session.handle(&["setoption", "name", "Depth", "value", "0"]);
    assert_eq!(session.depth_cap, 5);

    assert!(!session.handle(&["quit"]));
}

#[test]
fn test_session_go_runs_to_completion() {
    let mut session = Session::new(EngineConfig::default());
    session.handle(&["position", "startpos"]);
    session.handle(&["go", "depth", "2"]);
    session.controller.wait();
    assert!(!session.controller.is_running());

    session.handle(&["ucinewgame"]);
    assert_eq!(session.position, Position::startpos());
    assert_eq!(
        session.controller.state(),
        chess_core::EngineState::PositionSet
    );
}
