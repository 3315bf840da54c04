//! Time-boxed strategy execution and offline conformance testing.
//!
//! [`invoker`] is the only place in the client where a strategy is actually
//! called, and the only place where concurrency is mandatory: the strategy
//! runs on a blocking task that can be abandoned when the budget expires.
//! [`corpus`] and [`tester`] replay recorded positions through that same
//! invoker and aggregate pass/fail/timeout statistics.

pub mod corpus;
pub mod invoker;
pub mod tester;
