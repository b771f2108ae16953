//! Leaf-node counting for move generator validation.

use crate::board::Position;
use crate::movegen::legal_moves_into;
use crate::movelist::MoveList;
use crate::types::Move;

/// Number of leaf positions reachable in exactly `depth` plies.
pub fn perft(pos: &mut Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }
    let mut layers = vec![MoveList::new(); depth as usize];
    count(pos, depth, &mut layers[..])
}

/// Per-root-move leaf counts, in generation order. Their sum is
/// `perft(pos, depth)`.
pub fn perft_divide(pos: &mut Position, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    let mut layers = vec![MoveList::new(); depth as usize];
    let (root, rest) = layers
        .split_first_mut()
        .expect("at least one layer for depth >= 1");
    legal_moves_into(pos, root);

    root.iter()
        .map(|&mv| {
            let undo = pos.make_move(mv);
            let nodes = count(pos, depth - 1, rest);
            pos.unmake_move(mv, &undo);
            (mv, nodes)
        })
        .collect()
}

fn count(pos: &mut Position, depth: u8, layers: &mut [MoveList]) -> u64 {
    if depth == 0 {
        return 1;
    }

    let (buf, rest) = layers
        .split_first_mut()
        .expect("perft requires one buffer per remaining ply");
    legal_moves_into(pos, buf);

    if depth == 1 {
        return buf.len() as u64;
    }

    let mut nodes = 0u64;
    for &mv in buf.iter() {
        let undo = pos.make_move(mv);
        nodes += count(pos, depth - 1, rest);
        pos.unmake_move(mv, &undo);
    }
    nodes
}
