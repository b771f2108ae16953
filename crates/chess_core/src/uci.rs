//! Text helpers for the UCI protocol: moves, `position` and `go` arguments,
//! and `info` lines.

use std::time::Duration;

use tracing::warn;

use crate::board::Position;
use crate::error::{ChessError, ChessResult};
use crate::movegen::legal_moves;
use crate::search::{SearchInfo, mate_in};
use crate::time_control::SearchLimits;
use crate::types::*;

pub fn move_to_uci(mv: Move) -> String {
    mv.to_string()
}

/// Match long algebraic text (`e2e4`, `e7e8q`) against the legal moves of
/// `pos`, so castling and en-passant flags come from the generator.
///
/// A promotion without a suffix is taken as a queen promotion.
pub fn parse_uci_move(pos: &Position, txt: &str) -> ChessResult<Move> {
    if !txt.is_ascii() || !(4..=5).contains(&txt.len()) {
        return Err(ChessError::InvalidMoveText(txt.to_string()));
    }
    let square = |text: &str| {
        coord_to_sq(text).ok_or_else(|| ChessError::InvalidSquare(text.to_string()))
    };
    let from = square(&txt[0..2])?;
    let to = square(&txt[2..4])?;
    let promo = match txt[4..].chars().next() {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => Some(kind),
            _ => return Err(ChessError::InvalidMoveText(txt.to_string())),
        },
    };

    legal_moves(pos)
        .iter()
        .copied()
        .find(|m| {
            m.from == from
                && m.to == to
                && match m.promotion() {
                    Some(kind) => kind == promo.unwrap_or(PieceKind::Queen),
                    None => promo.is_none(),
                }
        })
        .ok_or_else(|| ChessError::IllegalMove(txt.to_string()))
}

/// Apply the arguments of a `position` command:
/// `startpos [moves ...]` or `fen <4 to 6 fields> [moves ...]`.
///
/// Returns the hashes of every position before the final one, oldest first,
/// for repetition detection. On error `pos` is left as it was.
pub fn set_position_from_uci(pos: &mut Position, args: &[&str]) -> ChessResult<Vec<u64>> {
    let moves_at = args.iter().position(|&a| a == "moves").unwrap_or(args.len());
    let (setup, moves) = args.split_at(moves_at);

    let mut scratch = match setup.first() {
        None | Some(&"startpos") => Position::startpos(),
        Some(&"fen") => Position::from_fen(&setup[1..].join(" "))?,
        Some(other) => {
            return Err(ChessError::InvalidFen {
                fen: other.to_string(),
                reason: "expected 'startpos' or 'fen'".to_string(),
            });
        }
    };

    let mut history = Vec::with_capacity(moves.len());
    for text in moves.iter().skip(1) {
        let mv = parse_uci_move(&scratch, text)?;
        history.push(scratch.position_hash());
        scratch.make_move(mv);
    }

    *pos = scratch;
    Ok(history)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<&&str>) -> Option<T> {
    let parsed = value.and_then(|v| v.parse().ok());
    if parsed.is_none() {
        warn!(key, value = value.copied(), "ignoring bad go argument");
    }
    parsed
}

/// Parse the arguments of a `go` command.
///
/// Without `depth` the limits are unbounded in depth and the search is cut
/// by time. Unknown or malformed arguments are logged and skipped.
pub fn parse_go(args: &[&str]) -> SearchLimits {
    let mut limits = SearchLimits::depth(u8::MAX);
    let mut i = 0;
    while i < args.len() {
        let key = args[i];
        let value = args.get(i + 1);
        let millis = |v: Option<u64>| v.map(Duration::from_millis);
        match key {
            "infinite" => {
                limits.infinite = true;
                i += 1;
                continue;
            }
            "depth" => {
                if let Some(d) = parse_number::<u32>(key, value) {
                    limits.depth = d.clamp(1, u8::MAX as u32) as u8;
                }
            }
            "movetime" => limits.move_time = millis(parse_number(key, value)),
            "wtime" => limits.clock.white_time = millis(parse_number(key, value)),
            "btime" => limits.clock.black_time = millis(parse_number(key, value)),
            "winc" => {
                limits.clock.white_inc = millis(parse_number(key, value)).unwrap_or_default()
            }
            "binc" => {
                limits.clock.black_inc = millis(parse_number(key, value)).unwrap_or_default()
            }
            "movestogo" => limits.clock.moves_to_go = parse_number(key, value),
            other => {
                warn!(argument = other, "ignoring unsupported go argument");
                i += 1;
                continue;
            }
        }
        i += 2;
    }
    limits
}

/// `cp <n>` or `mate <n>` as used in `info score`.
pub fn format_score(score: i32) -> String {
    match mate_in(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

/// One `info` line for a completed iteration.
pub fn format_info(info: &SearchInfo) -> String {
    let millis = info.elapsed.as_millis().max(1) as u64;
    let nps = info.nodes * 1000 / millis;
    let mut line = format!(
        "info depth {} seldepth {} score {} nodes {} nps {} hashfull {} time {}",
        info.depth,
        info.seldepth,
        format_score(info.score),
        info.nodes,
        nps,
        info.hashfull,
        info.elapsed.as_millis()
    );
    if !info.pv.is_empty() {
        line.push_str(" pv");
        for mv in &info.pv {
            line.push(' ');
            line.push_str(&move_to_uci(*mv));
        }
    }
    line
}

#[cfg(test)]
#[path = "uci_tests.rs"]
mod uci_tests;
