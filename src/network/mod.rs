//! Arena server communication.
//!
//! [`protocol`] defines the JSON wire messages, [`checkpoint`] persists
//! resumable session state, and [`session`] drives a live game over a
//! WebSocket transport.

pub mod checkpoint;
pub mod protocol;
pub mod session;
