//! Move-selection strategies.
//!
//! A strategy is the one piece of user-supplied logic in the client: a
//! decision function from a [`PositionSnapshot`] to a move in SAN. The
//! session loop and the offline tester never call a strategy directly; they
//! go through [`harness::invoker`](crate::harness::invoker), which enforces
//! the time budget.
//!
//! Implementations must be cheap to share (`Send + Sync`) because each
//! invocation runs on a separate blocking task that may outlive the caller's
//! deadline.

mod greedy;
mod random;

pub use greedy::GreedyStrategy;
pub use random::RandomStrategy;

use std::sync::Arc;

use crate::game::position::PositionSnapshot;

/// A move-selection decision function.
pub trait Strategy: Send + Sync {
    /// Short name used for selection and logging.
    fn name(&self) -> &'static str;

    /// Choose one move for the given position.
    ///
    /// The returned string must be an element of `snapshot.legal_moves`;
    /// anything else is classified as a fault by the invoker. Returning an
    /// error is allowed and is reported as an internal fault, never a crash.
    fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String>;
}

/// Always plays the first legal move. Also the rule the session loop uses as
/// a fallback when a strategy faults or times out.
#[derive(Debug, Default)]
pub struct FirstMoveStrategy;

impl Strategy for FirstMoveStrategy {
    fn name(&self) -> &'static str {
        "first"
    }

    fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String> {
        snapshot
            .first_legal()
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("no legal moves available"))
    }
}

/// Look up a built-in strategy by name.
///
/// Known names: `first`, `random`, `greedy`.
pub fn by_name(name: &str) -> Option<Arc<dyn Strategy>> {
    match name {
        "first" => Some(Arc::new(FirstMoveStrategy)),
        "random" => Some(Arc::new(RandomStrategy)),
        "greedy" => Some(Arc::new(GreedyStrategy)),
        _ => None,
    }
}

/// Names accepted by [`by_name`], for CLI error messages.
pub const STRATEGY_NAMES: &[&str] = &["first", "random", "greedy"];
