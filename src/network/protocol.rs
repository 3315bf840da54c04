//! Protocol messages.
//!
//! Wire format for client-server communication over WebSocket. All messages
//! are serialized as JSON with a `type` tag. The client treats the exchange
//! as one blocking request/response pair per turn; pushes it does not
//! recognize are skipped.

use serde::{Deserialize, Serialize};

use crate::game::position::PlayerColor;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the matchmaking queue for a new game.
    JoinQueue,

    /// Request the current board for an ongoing game.
    GetBoard {
        /// Game identifier.
        game_id: String,
        /// Our player identifier.
        player_id: String,
        /// Auth token issued at match time.
        auth_token: String,
    },

    /// Submit the chosen move.
    MakeMove {
        /// Game identifier.
        game_id: String,
        /// Our player identifier.
        player_id: String,
        /// Auth token issued at match time.
        auth_token: String,
        /// Chosen move in SAN.
        #[serde(rename = "move")]
        mv: String,
    },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Terminal result of a game, from this client's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    /// This client won.
    Win,
    /// This client lost.
    Loss,
    /// Stalemate or agreed draw.
    Draw,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Matchmaking succeeded; carries the game identity.
    MatchFound {
        /// Game identifier.
        game_id: String,
        /// Identifier assigned to this client.
        player_id: String,
        /// Token authenticating subsequent requests.
        auth_token: String,
        /// Color this client plays.
        assigned_color: PlayerColor,
        /// Per-move budget the server enforces, in seconds, if any.
        #[serde(default)]
        server_search_time: Option<f64>,
    },

    /// No opponent found in time; re-queue.
    QueueTimeout,

    /// Current position. The legal-move set is authoritative.
    BoardState {
        /// Position in FEN.
        fen: String,
        /// Legal moves in SAN for the side to move.
        legal_moves: Vec<String>,
        /// Whose turn it is.
        current_turn: PlayerColor,
        /// Whether the game has ended.
        #[serde(default)]
        game_over: bool,
        /// Winner when the game has ended decisively.
        #[serde(default)]
        winner: Option<PlayerColor>,
    },

    /// The submitted move was accepted.
    MoveAck,

    /// The game ended outside the normal board flow (forfeit,
    /// disqualification, opponent disconnect).
    GameOver {
        /// Winner, if decisive.
        #[serde(default)]
        winner: Option<PlayerColor>,
        /// Server-supplied explanation.
        #[serde(default)]
        reason: Option<String>,
    },

    /// Request-level failure.
    Error {
        /// Server-supplied explanation.
        message: String,
    },
}

impl ClientMessage {
    /// Serialize to the JSON wire format.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl ServerMessage {
    /// Parse from the JSON wire format.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
