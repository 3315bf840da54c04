//! Chess Arena Client
//!
//! Command-line entry point. `play` connects to an arena server and plays a
//! live game; `test` replays a recorded corpus through the strategy offline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use chess_arena::game::strategy::{self, Strategy};
use chess_arena::harness::corpus::Corpus;
use chess_arena::harness::tester::{self, CaseOutcome, TesterConfig};
use chess_arena::network::session::{ArenaSession, SessionConfig, WsTransport};
use chess_arena::{DEFAULT_SEARCH_TIME, VERSION};

#[derive(Debug, Parser)]
#[command(name = "chess-arena-client", version = VERSION, about = "Chess arena client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play a live game against an arena server.
    Play {
        /// Strategy to play with.
        #[arg(long, value_parser = strategy_names())]
        strategy: String,

        /// Per-move search budget in seconds.
        #[arg(long, default_value_t = DEFAULT_SEARCH_TIME, value_parser = parse_search_time)]
        search_time: f64,

        /// Arena server host.
        #[arg(long, default_value = "localhost")]
        host: String,

        /// Arena server port.
        #[arg(long, default_value_t = 9002)]
        port: u16,

        /// Where to persist game identity and session state for resumption.
        #[arg(long = "auth-file", default_value = ".arena_session.json")]
        auth_file: PathBuf,

        /// Resume the suspended game from the checkpoint instead of queueing
        /// for a new one.
        #[arg(long = "continue")]
        continue_game: bool,
    },

    /// Replay a recorded corpus through the strategy offline.
    Test {
        /// Strategy to evaluate.
        #[arg(long, value_parser = strategy_names())]
        strategy: String,

        /// Per-case budget in seconds.
        #[arg(long, default_value_t = DEFAULT_SEARCH_TIME, value_parser = parse_search_time)]
        search_time: f64,

        /// Evaluate a uniform random sample of this many cases.
        #[arg(long, value_parser = parse_sample_size)]
        sample: Option<usize>,

        /// Seed for reproducible sampling.
        #[arg(long, requires = "sample")]
        seed: Option<u64>,

        /// Corpus file, one JSON test case per line.
        #[arg(long, default_value = "test_cases.jsonl")]
        corpus: PathBuf,

        /// Where to write the summary JSON.
        #[arg(long, default_value = "test_result.json")]
        output: PathBuf,
    },
}

fn strategy_names() -> clap::builder::PossibleValuesParser {
    clap::builder::PossibleValuesParser::new(strategy::STRATEGY_NAMES)
}

/// The invoker requires a positive budget; reject anything else before a
/// negative value can reach `Duration::from_secs_f64`, which panics on it.
fn parse_search_time(s: &str) -> Result<f64, String> {
    let seconds: f64 = s
        .parse()
        .map_err(|e| format!("invalid search time `{s}`: {e}"))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!(
            "search time must be a positive number of seconds, got `{s}`"
        ))
    }
}

/// A run that evaluates nothing reports an empty all-pass summary, so a
/// sample size below 1 is a usage error, not a degenerate run.
fn parse_sample_size(s: &str) -> Result<usize, String> {
    let size: usize = s
        .parse()
        .map_err(|e| format!("invalid sample size `{s}`: {e}"))?;
    if size >= 1 {
        Ok(size)
    } else {
        Err("sample size must be at least 1".to_string())
    }
}

fn resolve_strategy(name: &str) -> anyhow::Result<Arc<dyn Strategy>> {
    strategy::by_name(name).with_context(|| format!("unknown strategy `{name}`"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(%e, "failed to start async runtime");
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(async {
        match cli.command {
            Command::Play {
                strategy,
                search_time,
                host,
                port,
                auth_file,
                continue_game,
            } => run_play(strategy, search_time, host, port, auth_file, continue_game).await,
            Command::Test {
                strategy,
                search_time,
                sample,
                seed,
                corpus,
                output,
            } => run_test(strategy, search_time, sample, seed, corpus, output).await,
        }
    });

    // An abandoned strategy call may still be running on a blocking thread;
    // a normal runtime shutdown would wait for it.
    std::process::exit(code);
}

async fn run_play(
    strategy: String,
    search_time: f64,
    host: String,
    port: u16,
    auth_file: PathBuf,
    continue_game: bool,
) -> i32 {
    let strategy = match resolve_strategy(&strategy) {
        Ok(s) => s,
        Err(e) => {
            error!(%e, "cannot start");
            return 1;
        }
    };

    info!(version = VERSION, strategy = strategy.name(), "chess arena client");

    let url = format!("ws://{host}:{port}/ws");
    let transport = match WsTransport::connect(&url).await {
        Ok(t) => t,
        Err(e) => {
            error!(%e, url, "failed to connect to arena server");
            return 1;
        }
    };

    let config = SessionConfig {
        search_time: Duration::from_secs_f64(search_time),
        checkpoint_path: auth_file,
        ..SessionConfig::default()
    };
    let mut session = ArenaSession::new(transport, strategy, config);

    let game = async {
        if continue_game {
            session.resume().await
        } else {
            session.run_new_game().await
        }
    };

    tokio::select! {
        result = game => match result {
            Ok(result) => {
                info!(?result, "game finished");
                0
            }
            Err(e) => {
                error!(%e, "session failed");
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // The checkpoint from the last completed turn stays on disk;
            // restart with --continue to resume.
            warn!("interrupted, game suspended (checkpoint retained)");
            0
        }
    }
}

async fn run_test(
    strategy: String,
    search_time: f64,
    sample: Option<usize>,
    seed: Option<u64>,
    corpus_path: PathBuf,
    output: PathBuf,
) -> i32 {
    let strategy = match resolve_strategy(&strategy) {
        Ok(s) => s,
        Err(e) => {
            error!(%e, "cannot start");
            return 1;
        }
    };

    let corpus = match Corpus::load(&corpus_path) {
        Ok(c) => c,
        Err(e) => {
            error!(%e, "failed to load test corpus");
            return 1;
        }
    };
    info!(
        cases = corpus.len(),
        skipped = corpus.skipped(),
        path = %corpus_path.display(),
        "corpus loaded"
    );

    let config = TesterConfig {
        budget: Duration::from_secs_f64(search_time),
        sample_size: sample,
        seed,
    };

    let summary = tester::run(strategy, &corpus, &config, |report| match &report.outcome {
        CaseOutcome::Pass { chosen, elapsed } => {
            info!(
                case = report.index,
                chosen,
                elapsed_ms = elapsed.as_millis() as u64,
                "pass"
            );
        }
        CaseOutcome::Fail { reason } => {
            warn!(case = report.index, fen = report.fen, reason, "fail");
        }
        CaseOutcome::Timeout { elapsed } => {
            warn!(
                case = report.index,
                fen = report.fen,
                elapsed_ms = elapsed.as_millis() as u64,
                "timeout"
            );
        }
    })
    .await;

    info!(
        passed = summary.passed,
        failed = summary.failed,
        timeouts = summary.timeouts,
        total = summary.total_tests,
        "done"
    );

    if let Err(e) = tester::write_summary(&summary, &output) {
        error!(%e, "failed to write results");
        return 1;
    }

    if summary.all_passed() {
        0
    } else {
        1
    }
}
