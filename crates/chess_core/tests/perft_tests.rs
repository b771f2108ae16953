use std::time::Instant;

use rayon::prelude::*;

use chess_core::{Position, START_FEN, perft, perft_divide};

/// Set to run the cases that exceed [`QUICK_NODE_LIMIT`].
const FULL_PERFT_ENV: &str = "FULL_PERFT";
const QUICK_NODE_LIMIT: u64 = 10_000_000;

struct EpdCase {
    line: usize,
    fen: String,
    /// (depth, expected leaf count), shallowest first.
    expected: Vec<(u8, u64)>,
}

/// Parse `<fen> ;D1 n ;D2 n ...`. Blank lines and `#` comments yield `None`.
fn parse_epd(line_no: usize, line: &str) -> Option<EpdCase> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (fen, rest) = line.split_once(';')?;

    let mut expected: Vec<(u8, u64)> = rest
        .split(';')
        .filter_map(|field| {
            let (key, value) = field.trim().split_once(' ')?;
            let depth = key.strip_prefix('D')?;
            Some((
                depth.parse().unwrap_or_else(|_| panic!("line {line_no}: bad depth {key}")),
                value.trim().parse().unwrap_or_else(|_| panic!("line {line_no}: bad count {value}")),
            ))
        })
        .collect();
    expected.sort_unstable_by_key(|&(depth, _)| depth);

    Some(EpdCase {
        line: line_no,
        fen: fen.trim().to_string(),
        expected,
    })
}

#[test]
fn perft_from_standard_epd() {
    let full = std::env::var_os(FULL_PERFT_ENV).is_some();
    let cases: Vec<EpdCase> = include_str!("standard.epd")
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_epd(i + 1, line))
        .collect();
    assert!(cases.len() >= 6, "suite should not be empty");

    cases.par_iter().for_each(|case| {
        let mut pos = Position::from_fen(&case.fen)
            .unwrap_or_else(|e| panic!("line {}: {e}", case.line));
        let before = pos.clone();
        let started = Instant::now();
        let mut nodes = 0u64;

        for &(depth, expected) in case.expected.iter().filter(|(_, n)| full || *n <= QUICK_NODE_LIMIT) {
            let got = perft(&mut pos, depth);
            assert_eq!(got, expected, "line {} '{}' depth {depth}", case.line, case.fen);
            assert_eq!(pos, before, "perft left line {} modified", case.line);
            nodes += got;
        }

        println!(
            "line {:>2}: {nodes} nodes in {:.2?}",
            case.line,
            started.elapsed()
        );
    });
}

#[test]
fn perft_startpos_shallow() {
    let mut pos = Position::from_fen(START_FEN).unwrap();
    for (depth, nodes) in [1u64, 20, 400, 8902, 197281].into_iter().enumerate() {
        assert_eq!(perft(&mut pos, depth as u8), nodes, "depth {depth}");
    }
}

#[test]
fn perft_divide_sums_to_perft() {
    let mut pos =
        Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
            .unwrap();
    let divide = perft_divide(&mut pos, 3);
    assert_eq!(divide.len(), 48);
    assert_eq!(divide.iter().map(|(_, n)| n).sum::<u64>(), 97862);

    let castle = divide
        .iter()
        .find(|(mv, _)| mv.to_string() == "e1g1")
        .expect("kingside castling is legal in kiwipete");
    assert!(castle.1 > 0);
}

#[test]
fn perft_depth_zero_is_one_leaf() {
    let mut pos = Position::startpos();
    assert_eq!(perft(&mut pos, 0), 1);
    assert!(perft_divide(&mut pos, 0).is_empty());
}
