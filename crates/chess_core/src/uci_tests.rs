use super::*;
use crate::fen::START_FEN;

#[test]
fn test_parse_uci_move_flags_come_from_generator() {
    let pos = Position::from_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 1").unwrap();

    let castle = parse_uci_move(&pos, "e1g1").unwrap();
    assert_eq!(castle.kind, MoveKind::Castle);

    let ep = parse_uci_move(&pos, "e5d6").unwrap();
    assert_eq!(ep.kind, MoveKind::EnPassant);

    let quiet = parse_uci_move(&pos, "a1a7").unwrap();
    assert_eq!(quiet.kind, MoveKind::Normal);
    assert_eq!(move_to_uci(quiet), "a1a7");
}

#[test]
fn test_parse_uci_move_promotions() {
    let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    assert_eq!(
        parse_uci_move(&pos, "b7b8n").unwrap().promotion(),
        Some(PieceKind::Knight)
    );
    assert_eq!(
        parse_uci_move(&pos, "b7b8").unwrap().promotion(),
        Some(PieceKind::Queen)
    );
    assert_eq!(move_to_uci(parse_uci_move(&pos, "b7b8r").unwrap()), "b7b8r");
    assert!(matches!(
        parse_uci_move(&pos, "b7b8k"),
        Err(ChessError::InvalidMoveText(_))
    ));
}

#[test]
fn test_parse_uci_move_errors() {
    let pos = Position::startpos();
    assert!(matches!(
        parse_uci_move(&pos, "e2"),
        Err(ChessError::InvalidMoveText(_))
    ));
    assert!(matches!(
        parse_uci_move(&pos, "z2e4"),
        Err(ChessError::InvalidSquare(_))
    ));
    assert!(matches!(
        parse_uci_move(&pos, "e2e5"),
        Err(ChessError::IllegalMove(_))
    ));
    // Suffix on a non-promotion.
    assert!(matches!(
        parse_uci_move(&pos, "e2e4q"),
        Err(ChessError::IllegalMove(_))
    ));
}

#[test]
fn test_set_position_startpos_with_moves() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let history = set_position_from_uci(&mut pos, &["startpos", "moves", "e2e4", "e7e5"]).unwrap();
    assert_eq!(
        pos.to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
    );
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], Position::startpos().position_hash());
}

#[test]
fn test_set_position_fen() {
    let mut pos = Position::startpos();
    let args = ["fen", "k7/8/8/8/8/8/8/4K2R", "w", "K", "-", "0", "1", "moves", "e1g1"];
    let history = set_position_from_uci(&mut pos, &args).unwrap();
    assert_eq!(pos.to_fen(), "k7/8/8/8/8/8/8/5RK1 b - - 1 1");
    assert_eq!(history.len(), 1);
}

#[test]
fn test_set_position_failure_keeps_previous() {
    let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
    let before = pos.clone();

    assert!(set_position_from_uci(&mut pos, &["startpos", "moves", "e2e4", "e2e4"]).is_err());
    assert_eq!(pos, before);

    assert!(set_position_from_uci(&mut pos, &["fen", "not", "a", "fen", "string"]).is_err());
    assert_eq!(pos, before);

    assert!(set_position_from_uci(&mut pos, &["sideways"]).is_err());
    assert_eq!(pos, before);

    set_position_from_uci(&mut pos, &[]).unwrap();
    assert_eq!(pos.to_fen(), START_FEN);
}

#[test]
fn test_parse_go() {
    let limits = parse_go(&["depth", "6"]);
    assert_eq!(limits.depth, 6);
    assert!(!limits.infinite);

    let limits = parse_go(&["wtime", "60000", "btime", "50000", "winc", "1000", "movestogo", "20"]);
    assert_eq!(limits.depth, u8::MAX);
    assert_eq!(limits.clock.white_time, Some(Duration::from_millis(60_000)));
    assert_eq!(limits.clock.black_time, Some(Duration::from_millis(50_000)));
    assert_eq!(limits.clock.white_inc, Duration::from_millis(1000));
    assert_eq!(limits.clock.black_inc, Duration::ZERO);
    assert_eq!(limits.clock.moves_to_go, Some(20));

    let limits = parse_go(&["movetime", "250"]);
    assert_eq!(limits.move_time, Some(Duration::from_millis(250)));

    assert!(parse_go(&["infinite"]).infinite);
}

#[test]
fn test_parse_go_skips_bad_arguments() {
    let limits = parse_go(&["depth", "x", "ponder", "movetime", "100"]);
    assert_eq!(limits.depth, u8::MAX);
    assert_eq!(limits.move_time, Some(Duration::from_millis(100)));
}

#[test]
fn test_format_score() {
    assert_eq!(format_score(35), "cp 35");
    assert_eq!(format_score(-120), "cp -120");
    assert_eq!(format_score(crate::search::MATE - 3), "mate 2");
    assert_eq!(format_score(-crate::search::MATE + 2), "mate -1");
}

#[test]
fn test_format_info() {
    let info = SearchInfo {
        depth: 3,
        seldepth: 7,
        score: 25,
        nodes: 5000,
        elapsed: Duration::from_millis(100),
        hashfull: 12,
        pv: vec![Move::new(12, 28), Move::new(52, 36)],
    };
    assert_eq!(
        format_info(&info),
        "info depth 3 seldepth 7 score cp 25 nodes 5000 nps 50000 hashfull 12 time 100 pv e2e4 e7e5"
    );
}
