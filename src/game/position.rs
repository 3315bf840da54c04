//! Position snapshots.
//!
//! A snapshot is the complete, immutable description of one turn: board
//! encoding (FEN), the legal moves available, and the color to play. It is
//! built fresh per turn by the session loop or loaded from a corpus record,
//! and discarded once the turn resolves.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side assigned to the player for a game or recorded position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    /// White pieces, moves first.
    White,
    /// Black pieces.
    Black,
}

impl fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerColor::White => write!(f, "white"),
            PlayerColor::Black => write!(f, "black"),
        }
    }
}

/// An immutable description of one game position.
///
/// The legal-move set is produced by the arena's rules engine and is trusted
/// as-is; the only validation this client ever performs on a chosen move is
/// membership in this set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Piece placement, side to move, castling/en-passant rights, and move
    /// counters in FEN.
    pub fen: String,
    /// Legal moves in SAN. Never empty unless the game has already ended.
    pub legal_moves: Vec<String>,
    /// Color the strategy is playing.
    pub color: PlayerColor,
}

impl PositionSnapshot {
    /// Create a snapshot for one turn.
    pub fn new(fen: impl Into<String>, legal_moves: Vec<String>, color: PlayerColor) -> Self {
        Self {
            fen: fen.into(),
            legal_moves,
            color,
        }
    }

    /// Set-membership check for a chosen move.
    pub fn is_legal(&self, mv: &str) -> bool {
        self.legal_moves.iter().any(|m| m == mv)
    }

    /// Deterministic fallback: the first legal move, if any.
    pub fn first_legal(&self) -> Option<&str> {
        self.legal_moves.first().map(String::as_str)
    }
}
