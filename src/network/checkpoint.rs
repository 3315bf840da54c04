//! Resumable session state.
//!
//! After every acknowledged move the session writes a checkpoint: game
//! identity, turn index, and accumulated move history. On restart with a
//! continue directive the checkpoint is read once and the session re-enters
//! the game with the stored identity instead of re-queueing.
//!
//! The write goes to a temporary file first and is renamed into place, so a
//! process stop mid-write never leaves a torn checkpoint for resume to read.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::position::PlayerColor;

/// Identity of this client within one game, issued at match time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdentity {
    /// Game identifier.
    pub game_id: String,
    /// Identifier assigned to this client.
    pub player_id: String,
    /// Color this client plays.
    pub color: PlayerColor,
    /// Token authenticating requests for this game.
    pub auth_token: String,
}

/// Checkpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    /// No checkpoint exists (or it could not be read).
    #[error("failed to read checkpoint {path}: {source}")]
    Unreadable {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The checkpoint file exists but does not parse.
    #[error("checkpoint {path} is corrupt: {source}")]
    Corrupt {
        /// Path that was loaded.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },

    /// The checkpoint could not be written.
    #[error("failed to write checkpoint {path}: {source}")]
    WriteFailed {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Persisted session state for one game in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCheckpoint {
    /// Who we are in this game.
    pub identity: GameIdentity,
    /// Completed turns of ours.
    pub turn_index: u32,
    /// Our moves in order, in SAN.
    pub history: Vec<String>,
    /// When this checkpoint was written.
    pub saved_at: DateTime<Utc>,
}

impl SessionCheckpoint {
    /// Fresh checkpoint for a newly matched game.
    pub fn new(identity: GameIdentity) -> Self {
        Self {
            identity,
            turn_index: 0,
            history: Vec::new(),
            saved_at: Utc::now(),
        }
    }

    /// Record one completed turn.
    pub fn record_turn(&mut self, mv: String) {
        self.history.push(mv);
        self.turn_index += 1;
        self.saved_at = Utc::now();
    }

    /// Write the checkpoint atomically (temp file + rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), CheckpointError> {
        let path = path.as_ref();
        let write_failed = |source| CheckpointError::WriteFailed {
            path: path.to_path_buf(),
            source,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| CheckpointError::WriteFailed {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json).map_err(write_failed)?;
        fs::rename(&tmp, path).map_err(write_failed)?;

        debug!(path = %path.display(), turn = self.turn_index, "checkpoint saved");
        Ok(())
    }

    /// Read a checkpoint once at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CheckpointError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| CheckpointError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Remove the checkpoint after a terminal result. Missing files are fine.
    pub fn clear(path: impl AsRef<Path>) {
        let path = path.as_ref();
        match fs::remove_file(path) {
            Ok(()) => debug!(path = %path.display(), "checkpoint cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => debug!(path = %path.display(), %e, "failed to clear checkpoint"),
        }
    }
}
