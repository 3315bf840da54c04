//! Deadline-enforced strategy invocation.
//!
//! A strategy is arbitrary user code: it may return an illegal move, return
//! an error, panic, or never return at all. [`invoke`] turns every one of
//! those behaviors into a typed [`StrategyOutcome`] and guarantees the
//! caller regains control no later than `budget + grace`.
//!
//! The strategy call runs on a dedicated blocking task. The caller awaits
//! "result or deadline", never "strategy returned"; when the deadline fires
//! first, the task is abandoned and its eventual result, if any, is
//! discarded. Nothing is shared between invocations except the snapshot,
//! which the strategy receives as its own clone.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinError;
use tracing::warn;

use crate::game::position::PositionSnapshot;
use crate::game::strategy::Strategy;
use crate::TIMEOUT_GRACE_MS;

/// Fixed tolerance absorbed into every deadline.
pub fn grace() -> Duration {
    Duration::from_millis(TIMEOUT_GRACE_MS)
}

/// Why a strategy's answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FaultReason {
    /// The returned move is not a member of the snapshot's legal-move set.
    #[error("not in legal moves")]
    NotInLegalMoves {
        /// The move the strategy actually returned.
        chosen: String,
    },

    /// The strategy returned an empty string.
    #[error("empty move")]
    EmptyMove,

    /// The strategy returned an error or panicked.
    #[error("internal exception: {0}")]
    Internal(String),
}

/// The typed result of one strategy invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyOutcome {
    /// A legal move, verified by set membership.
    Move(String),
    /// The strategy answered in time but the answer was unusable.
    Fault(FaultReason),
    /// No answer by the deadline; the call was abandoned.
    TimedOut {
        /// Wall-clock time elapsed when the caller gave up.
        elapsed: Duration,
    },
}

impl StrategyOutcome {
    /// True for [`StrategyOutcome::Move`].
    pub fn is_move(&self) -> bool {
        matches!(self, StrategyOutcome::Move(_))
    }
}

/// One completed invocation: the outcome plus total measured duration.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// What the invocation produced.
    pub outcome: StrategyOutcome,
    /// Wall-clock duration of the whole invocation.
    pub elapsed: Duration,
}

/// Call a strategy with a hard wall-clock budget.
///
/// Returns within `budget + grace` regardless of what the strategy does.
/// The budget must be positive and the snapshot's legal-move set non-empty;
/// both are enforced by the callers (CLI validation and the game-over checks
/// in the session loop and corpus loader).
pub async fn invoke(
    strategy: Arc<dyn Strategy>,
    snapshot: &PositionSnapshot,
    budget: Duration,
) -> Invocation {
    debug_assert!(!budget.is_zero(), "budget must be positive");
    debug_assert!(!snapshot.legal_moves.is_empty(), "no legal moves to choose from");

    let snap = snapshot.clone();
    let name = strategy.name();
    let started = Instant::now();

    let call = tokio::task::spawn_blocking(move || strategy.choose_move(&snap));

    let outcome = match tokio::time::timeout(budget + grace(), call).await {
        Ok(Ok(Ok(mv))) => classify(mv, snapshot),
        Ok(Ok(Err(err))) => StrategyOutcome::Fault(FaultReason::Internal(format!("{err:#}"))),
        Ok(Err(join_err)) => {
            StrategyOutcome::Fault(FaultReason::Internal(panic_detail(join_err)))
        }
        Err(_) => {
            // Dropping the join handle detaches the blocking task; its
            // eventual result is discarded.
            let elapsed = started.elapsed();
            warn!(
                strategy = name,
                elapsed_ms = elapsed.as_millis() as u64,
                budget_ms = budget.as_millis() as u64,
                "strategy exceeded budget, abandoning call"
            );
            StrategyOutcome::TimedOut { elapsed }
        }
    };

    Invocation {
        outcome,
        elapsed: started.elapsed(),
    }
}

/// Validate an in-time answer against the snapshot.
fn classify(mv: String, snapshot: &PositionSnapshot) -> StrategyOutcome {
    if mv.is_empty() {
        StrategyOutcome::Fault(FaultReason::EmptyMove)
    } else if !snapshot.is_legal(&mv) {
        StrategyOutcome::Fault(FaultReason::NotInLegalMoves { chosen: mv })
    } else {
        StrategyOutcome::Move(mv)
    }
}

/// Extract a human-readable detail from a panicked blocking task.
fn panic_detail(err: JoinError) -> String {
    match err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "strategy panicked".to_string()
            }
        }
        Err(err) => err.to_string(),
    }
}
