//! Domain types and move-selection strategies.
//!
//! Everything in this module is independent of the network layer: a
//! [`PositionSnapshot`](position::PositionSnapshot) can come from a live
//! arena turn or from a recorded corpus line, and a
//! [`Strategy`](strategy::Strategy) never knows the difference.

pub mod position;
pub mod strategy;
