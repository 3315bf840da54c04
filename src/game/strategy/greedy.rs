//! Default strategy: greedy SAN-surface move ordering.
//!
//! The client deliberately carries no rules engine, so this strategy scores
//! moves by what SAN itself reveals: mate and check suffixes, captures,
//! promotions, and piece activity. It is not strong chess, but it is
//! deterministic, instant, and always legal, which is what the default
//! strategy needs to be.

use crate::game::position::PositionSnapshot;
use crate::game::strategy::Strategy;

/// Prefers checkmates, then checks, promotions, and captures, breaking ties
/// by moved-piece value and finally by corpus order.
#[derive(Debug, Default)]
pub struct GreedyStrategy;

/// Score a single SAN move from its notation alone.
fn score(san: &str) -> i32 {
    let mut s = 0;

    if san.ends_with('#') {
        s += 10_000;
    } else if san.ends_with('+') {
        s += 500;
    }

    if san.contains('x') {
        s += 300;
    }

    // Promotion, e.g. "e8=Q"
    if let Some(idx) = san.find('=') {
        s += match san.as_bytes().get(idx + 1) {
            Some(b'Q') => 900,
            Some(b'R') => 500,
            Some(b'N') | Some(b'B') => 300,
            _ => 0,
        };
    }

    // Castling keeps the king safe; nudge it above quiet pawn moves.
    if san.starts_with("O-O") {
        s += 50;
    }

    // Piece activity by the moving piece's letter (pawn moves start with a
    // file letter and score zero here).
    s += match san.chars().next() {
        Some('Q') => 9,
        Some('R') => 5,
        Some('B') | Some('N') => 3,
        _ => 0,
    };

    s
}

impl Strategy for GreedyStrategy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String> {
        snapshot
            .legal_moves
            .iter()
            .enumerate()
            // max_by_key returns the last maximum; negate the index so ties
            // resolve to the earliest move, keeping selection deterministic.
            .max_by_key(|(i, mv)| (score(mv), -(*i as i64)))
            .map(|(_, mv)| mv.clone())
            .ok_or_else(|| anyhow::anyhow!("no legal moves available"))
    }
}
