//! Perft throughput benchmark, suitable for `cargo flamegraph`.
//!
//! ```text
//! cargo run --release --example perft_bench -p chess_core -- [depth] [fen]
//! ```
//!
//! Without a FEN the first positions of `tests/standard.epd` are timed at
//! `depth` (default 5). With a FEN the per-move split is printed as well.

use std::time::{Duration, Instant};

use chess_core::{Position, move_to_uci, perft, perft_divide};

const SUITE: &str = include_str!("../tests/standard.epd");
const SUITE_SIZE: usize = 6;

fn nps(nodes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { nodes as f64 / secs } else { 0.0 }
}

fn timed(pos: &mut Position, depth: u8) -> (u64, Duration) {
    let started = Instant::now();
    let nodes = perft(pos, depth);
    (nodes, started.elapsed())
}

fn main() {
    let mut args = std::env::args().skip(1);
    let depth: u8 = args.next().and_then(|d| d.parse().ok()).unwrap_or(5);
    let fen = args.next();

    chess_core::init();

    match fen {
        Some(fen) => single(&fen, depth),
        None => suite(depth),
    }
}

fn single(fen: &str, depth: u8) {
    let mut pos = match Position::from_fen(fen) {
        Ok(pos) => pos,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for (mv, nodes) in perft_divide(&mut pos, depth) {
        println!("{}: {nodes}", move_to_uci(mv));
    }
    let (nodes, elapsed) = timed(&mut pos, depth);
    println!("\n{nodes} nodes in {elapsed:.3?} ({:.0} nps)", nps(nodes, elapsed));
}

fn suite(depth: u8) {
    let mut total = (0u64, Duration::ZERO);

    let fens = SUITE
        .lines()
        .filter_map(|line| line.split(';').next())
        .map(str::trim)
        .filter(|fen| !fen.is_empty())
        .take(SUITE_SIZE);

    for fen in fens {
        let Ok(mut pos) = Position::from_fen(fen) else {
            eprintln!("skipping unparsable FEN: {fen}");
            continue;
        };
        let (nodes, elapsed) = timed(&mut pos, depth);
        total.0 += nodes;
        total.1 += elapsed;
        println!("{nodes:>12} {elapsed:>10.3?} {:>12.0} nps  {fen}", nps(nodes, elapsed));
    }

    println!(
        "{:>12} {:>10.3?} {:>12.0} nps  total at depth {depth}",
        total.0,
        total.1,
        nps(total.0, total.1)
    );
}
