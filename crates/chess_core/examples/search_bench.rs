//! Fixed-depth search benchmark for profiling with cargo-flamegraph.
//!
//! Usage:
//!   cargo flamegraph --example search_bench -p chess_core -- [depth]

use chess_core::{MaterialEvaluator, Position, SearchLimits, Searcher};
use std::env;
use std::time::{Duration, Instant};

/// Positions covering different game phases and complexity levels
const TEST_POSITIONS: &[(&str, &str)] = &[
    (
        "Start",
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    ),
    (
        "Sicilian",
        "rnbqkbnr/pp1ppppp/8/2p5/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2",
    ),
    (
        "Kiwipete",
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
    ),
    (
        "Complex",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - -",
    ),
    ("Endgame", "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -"),
];

fn main() {
    let depth: u8 = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(6);

    chess_core::init();

    println!("=== Search Benchmark ===");
    println!("Depth: {depth}");
    println!();

    let mut total_nodes = 0u64;
    let mut total_time = Duration::ZERO;

    for (name, fen) in TEST_POSITIONS {
        let pos = Position::from_fen(fen).expect("benchmark FENs are valid");
        let mut searcher = Searcher::new(MaterialEvaluator, 64);

        let start = Instant::now();
        let result = searcher.search(&pos, &[], &SearchLimits::depth(depth), |_| {});
        let elapsed = start.elapsed();

        total_nodes += result.nodes;
        total_time += elapsed;

        let best = result
            .best_move
            .map(|m| m.to_string())
            .unwrap_or_else(|| "none".to_string());
        println!(
            "{name:.<20} {best:>6} {:>12} nodes in {elapsed:>8.3?}",
            result.nodes
        );
    }

    println!();
    let nps = total_nodes as f64 / total_time.as_secs_f64().max(1e-9);
    println!("TOTAL: {total_nodes} nodes in {total_time:.3?} ({nps:.0} nps)");
}
