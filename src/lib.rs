//! # Chess Arena Client
//!
//! Client library for playing chess against a Chess Arena server and for
//! validating strategies offline against recorded positions.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CHESS ARENA CLIENT                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Domain types and strategies               │
//! │  ├── position.rs - Position snapshots, player color          │
//! │  └── strategy/   - Strategy trait + built-in strategies      │
//! │                                                              │
//! │  harness/        - Time-boxed execution + offline testing    │
//! │  ├── invoker.rs  - Deadline-enforced strategy invocation     │
//! │  ├── corpus.rs   - Recorded position corpus (JSONL)          │
//! │  └── tester.rs   - Conformance runs and summaries            │
//! │                                                              │
//! │  network/        - Arena server communication                │
//! │  ├── protocol.rs - Message types                             │
//! │  ├── checkpoint.rs - Resumable session state                 │
//! │  └── session.rs  - WebSocket transport + game loop           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Execution contract
//!
//! Strategies are arbitrary user code and may never return. Every strategy
//! call therefore runs on its own blocking task; the caller only ever waits
//! on "outcome available or deadline elapsed". An overdue call is abandoned
//! and its eventual result discarded, so neither the live session loop nor
//! the offline tester can be hung by a single bad strategy.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod harness;
pub mod network;

// Re-export commonly used types
pub use game::position::{PlayerColor, PositionSnapshot};
pub use game::strategy::Strategy;
pub use harness::invoker::{invoke, FaultReason, Invocation, StrategyOutcome};
pub use harness::tester::TestRunSummary;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default per-move search budget in seconds.
pub const DEFAULT_SEARCH_TIME: f64 = 5.0;

/// Fixed tolerance added to every deadline, in milliseconds. The arena
/// server applies its own tolerance when judging move times; enforcing the
/// budget exactly would reject moves the server would have accepted.
pub const TIMEOUT_GRACE_MS: u64 = 100;
