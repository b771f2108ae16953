use super::*;

fn eval(fen: &str) -> i32 {
    ClassicalEvaluator::default().evaluate(&Position::from_fen(fen).unwrap())
}

#[test]
fn test_startpos_is_balanced() {
    assert_eq!(eval(chess_core::START_FEN), 0);
    assert_eq!(
        eval("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"),
        0
    );
}

#[test]
fn test_mirrored_positions_score_the_same() {
    // The same position with colors swapped and the board flipped.
    let white = eval("r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3");
    let black = eval("rnbqkb1r/pppp1ppp/5n2/4p3/4P3/2N5/PPPP1PPP/R1BQKBNR b KQkq - 2 3");
    assert_eq!(white, black);
}

#[test]
fn test_material_dominates() {
    let up_a_rook = eval("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
    assert!(up_a_rook > 400, "{up_a_rook}");
    let down_a_rook = eval("4k3/8/8/8/8/8/8/R3K3 b - - 0 1");
    assert_eq!(down_a_rook, -up_a_rook);
}

#[test]
fn test_central_knight_beats_rim_knight() {
    let center = eval("4k3/8/8/8/3N4/8/8/4K3 w - - 0 1");
    let rim = eval("4k3/8/8/8/N7/8/8/4K3 w - - 0 1");
    assert!(center > rim);
}

#[test]
fn test_king_centralizes_in_endgame() {
    let central = eval("4k3/pppp4/8/8/4K3/8/PPPP4/8 w - - 0 1");
    let corner = eval("4k3/pppp4/8/8/8/8/PPPP4/K7 w - - 0 1");
    assert!(central > corner);
}

#[test]
fn test_game_phase() {
    let start = Position::startpos();
    assert_eq!(game_phase(&start), 24);
    assert!(!is_endgame(&start));

    let bare = Position::from_fen("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1").unwrap();
    assert_eq!(game_phase(&bare), 0);
    assert!(is_endgame(&bare));

    let evaluator = ClassicalEvaluator::default();
    assert!(!Evaluator::is_endgame(&evaluator, &start));
    assert!(Evaluator::is_endgame(&evaluator, &bare));
}

#[test]
fn test_contempt_charged_to_root_side() {
    let pos = Position::startpos();
    let mut evaluator = ClassicalEvaluator::default();
    evaluator.root_side = Color::White;
    assert_eq!(evaluator.draw_score(&pos), -DEFAULT_CONTEMPT);

    evaluator.root_side = Color::Black;
    assert_eq!(evaluator.draw_score(&pos), DEFAULT_CONTEMPT);

    let endgame = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
    assert_eq!(evaluator.draw_score(&endgame), 0);
}
