//! Conformance test runs.
//!
//! Replays corpus records through the invoker in order, classifies each
//! outcome, and accumulates a [`TestRunSummary`]. A timed-out case counts as
//! both a timeout and a failure; the double counting matches the documented
//! output format, so `passed + failed == total_tests` and
//! `timeouts <= failed` always hold.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::strategy::Strategy;
use crate::harness::corpus::Corpus;
use crate::harness::invoker::{invoke, StrategyOutcome};

/// Configuration for one conformance run.
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Per-case wall-clock budget.
    pub budget: Duration,
    /// Evaluate only a random subset of this size, when smaller than the
    /// corpus.
    pub sample_size: Option<usize>,
    /// Seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl TesterConfig {
    /// Run the whole corpus with the given budget.
    pub fn with_budget(budget: Duration) -> Self {
        Self {
            budget,
            sample_size: None,
            seed: None,
        }
    }
}

/// How a single case resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseOutcome {
    /// The strategy returned a legal move in time.
    Pass {
        /// The chosen move.
        chosen: String,
        /// Invocation duration.
        elapsed: Duration,
    },
    /// The strategy answered but the answer was rejected.
    Fail {
        /// Human-readable fault reason.
        reason: String,
    },
    /// No answer within budget. Counted as a failure too.
    Timeout {
        /// Time spent before the call was abandoned.
        elapsed: Duration,
    },
}

/// One case's result, delivered to the per-case callback as it happens.
#[derive(Debug, Clone)]
pub struct CaseReport {
    /// 1-based case number in run order.
    pub index: usize,
    /// Board encoding of the case, for diagnostics.
    pub fen: String,
    /// Classification of the invocation.
    pub outcome: CaseOutcome,
}

/// Aggregate results of a conformance run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunSummary {
    /// Cases that produced a legal move in time.
    pub passed: usize,
    /// Cases that faulted or timed out.
    pub failed: usize,
    /// Cases that hit the deadline (subset of `failed`).
    pub timeouts: usize,
    /// Number of cases evaluated.
    pub total_tests: usize,
    /// Whether a random subset was evaluated.
    pub sampled: bool,
    /// Full corpus size, present only when sampled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_total_tests: Option<usize>,
}

impl TestRunSummary {
    /// True when every evaluated case passed.
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Run a strategy over the corpus.
///
/// Records are evaluated serially, one invocation at a time, in corpus order
/// (or sampled order). `on_case` fires after each case with its report.
pub async fn run(
    strategy: Arc<dyn Strategy>,
    corpus: &Corpus,
    config: &TesterConfig,
    mut on_case: impl FnMut(&CaseReport),
) -> TestRunSummary {
    let selection = corpus.select(config.sample_size, config.seed);
    let total = selection.records.len();

    info!(
        strategy = strategy.name(),
        total,
        sampled = selection.sampled,
        budget_ms = config.budget.as_millis() as u64,
        "starting conformance run"
    );

    let mut passed = 0usize;
    let mut failed = 0usize;
    let mut timeouts = 0usize;

    for (i, record) in selection.records.iter().enumerate() {
        let snapshot = record.to_snapshot();
        let invocation = invoke(strategy.clone(), &snapshot, config.budget).await;

        let outcome = match invocation.outcome {
            StrategyOutcome::Move(chosen) => {
                passed += 1;
                CaseOutcome::Pass {
                    chosen,
                    elapsed: invocation.elapsed,
                }
            }
            StrategyOutcome::Fault(reason) => {
                failed += 1;
                CaseOutcome::Fail {
                    reason: reason.to_string(),
                }
            }
            StrategyOutcome::TimedOut { elapsed } => {
                failed += 1;
                timeouts += 1;
                CaseOutcome::Timeout { elapsed }
            }
        };

        on_case(&CaseReport {
            index: i + 1,
            fen: record.fen.clone(),
            outcome,
        });
    }

    let summary = TestRunSummary {
        passed,
        failed,
        timeouts,
        total_tests: total,
        sampled: selection.sampled,
        original_total_tests: selection.sampled.then_some(selection.original_total),
    };

    info!(
        passed = summary.passed,
        failed = summary.failed,
        timeouts = summary.timeouts,
        total = summary.total_tests,
        "conformance run finished"
    );

    summary
}

/// Write the summary as pretty JSON, the format consumed by tooling.
pub fn write_summary(summary: &TestRunSummary, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    info!(path = %path.display(), "test results written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::position::{PlayerColor, PositionSnapshot};
    use crate::game::strategy::FirstMoveStrategy;
    use crate::harness::corpus::TestCaseRecord;

    struct FnStrategy(fn(&PositionSnapshot) -> anyhow::Result<String>);

    impl Strategy for FnStrategy {
        fn name(&self) -> &'static str {
            "test-fn"
        }

        fn choose_move(&self, snapshot: &PositionSnapshot) -> anyhow::Result<String> {
            (self.0)(snapshot)
        }
    }

    fn record(fen: &str) -> TestCaseRecord {
        TestCaseRecord {
            fen: fen.into(),
            legal_moves: vec!["e4".into(), "d4".into()],
            player_color: PlayerColor::White,
        }
    }

    fn corpus(n: usize) -> Corpus {
        Corpus::from_records((0..n).map(|i| record(&format!("fen-{i}"))).collect())
    }

    fn check_invariants(summary: &TestRunSummary) {
        assert_eq!(summary.passed + summary.failed, summary.total_tests);
        assert!(summary.timeouts <= summary.failed);
    }

    #[tokio::test]
    async fn test_first_move_strategy_passes_all() {
        let summary = run(
            Arc::new(FirstMoveStrategy),
            &corpus(3),
            &TesterConfig::with_budget(Duration::from_secs(5)),
            |_| {},
        )
        .await;

        assert_eq!(
            summary,
            TestRunSummary {
                passed: 3,
                failed: 0,
                timeouts: 0,
                total_tests: 3,
                sampled: false,
                original_total_tests: None,
            }
        );
        assert!(summary.all_passed());
    }

    #[tokio::test]
    async fn test_illegal_move_fails_with_reason() {
        let mut reports = Vec::new();
        let summary = run(
            Arc::new(FnStrategy(|_| Ok("Zz9".into()))),
            &corpus(2),
            &TesterConfig::with_budget(Duration::from_secs(5)),
            |report| reports.push(report.clone()),
        )
        .await;

        check_invariants(&summary);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.timeouts, 0);

        assert_eq!(reports.len(), 2);
        for report in &reports {
            match &report.outcome {
                CaseOutcome::Fail { reason } => assert_eq!(reason, "not in legal moves"),
                other => panic!("expected fail, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_timeout_counts_as_both() {
        let summary = run(
            Arc::new(FnStrategy(|s| {
                std::thread::sleep(Duration::from_millis(300));
                Ok(s.legal_moves[0].clone())
            })),
            &corpus(1),
            &TesterConfig::with_budget(Duration::from_millis(50)),
            |_| {},
        )
        .await;

        check_invariants(&summary);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.timeouts, 1);
    }

    #[tokio::test]
    async fn test_mixed_outcomes() {
        // Fault on even fens, pass on odd ones.
        let summary = run(
            Arc::new(FnStrategy(|s| {
                let n: usize = s.fen.rsplit('-').next().unwrap().parse().unwrap();
                if n % 2 == 0 {
                    anyhow::bail!("even positions confuse me")
                }
                Ok(s.legal_moves[0].clone())
            })),
            &corpus(5),
            &TesterConfig::with_budget(Duration::from_secs(5)),
            |_| {},
        )
        .await;

        check_invariants(&summary);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.timeouts, 0);
    }

    #[tokio::test]
    async fn test_sampled_run_records_original_total() {
        let summary = run(
            Arc::new(FirstMoveStrategy),
            &corpus(10),
            &TesterConfig {
                budget: Duration::from_secs(5),
                sample_size: Some(4),
                seed: Some(7),
            },
            |_| {},
        )
        .await;

        check_invariants(&summary);
        assert_eq!(summary.total_tests, 4);
        assert!(summary.sampled);
        assert_eq!(summary.original_total_tests, Some(10));
    }

    #[tokio::test]
    async fn test_callback_sees_every_case_in_order() {
        let mut indices = Vec::new();
        run(
            Arc::new(FirstMoveStrategy),
            &corpus(4),
            &TesterConfig::with_budget(Duration::from_secs(5)),
            |report| indices.push(report.index),
        )
        .await;
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_summary_serialization() {
        let summary = TestRunSummary {
            passed: 3,
            failed: 1,
            timeouts: 1,
            total_tests: 4,
            sampled: true,
            original_total_tests: Some(10),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"original_total_tests\":10"));

        let unsampled = TestRunSummary {
            sampled: false,
            original_total_tests: None,
            ..summary
        };
        let json = serde_json::to_string(&unsampled).unwrap();
        assert!(!json.contains("original_total_tests"));
    }

    #[test]
    fn test_write_summary() {
        let summary = TestRunSummary {
            passed: 1,
            failed: 0,
            timeouts: 0,
            total_tests: 1,
            sampled: false,
            original_total_tests: None,
        };
        let path = std::env::temp_dir().join(format!("chess-arena-summary-{}.json", std::process::id()));
        write_summary(&summary, &path).unwrap();

        let loaded: TestRunSummary =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, summary);
    }
}
