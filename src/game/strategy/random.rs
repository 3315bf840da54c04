//! Random demo strategy.
//!
//! No chess logic at all; it exists as the minimal working example of the
//! [`Strategy`] trait and as a noise opponent for harness tests.

use rand::seq::SliceRandom;

use crate::game::position::PositionSnapshot;
use crate::game::strategy::Strategy;

/// Picks a uniformly random legal move.
#[derive(Debug, Default)]
pub struct RandomStrategy;

impl Strategy for RandomStrategy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String> {
        snapshot
            .legal_moves
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no legal moves available"))
    }
}
