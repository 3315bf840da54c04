//! Recorded position corpus.
//!
//! The corpus is a line-oriented JSONL file: one recorded position per line
//! with `fen`, `legal_moves`, and `player_color` fields. Records carry no
//! expected answer; a case passes when the strategy returns any legal move
//! within budget.
//!
//! An unreadable file is fatal. A malformed individual line is skipped with
//! a warning and counted, never reported as a test failure.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::game::position::{PlayerColor, PositionSnapshot};

/// One corpus line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseRecord {
    /// Board encoding in FEN.
    pub fen: String,
    /// Legal moves in SAN.
    pub legal_moves: Vec<String>,
    /// Side to move.
    pub player_color: PlayerColor,
}

impl TestCaseRecord {
    /// Build the snapshot handed to the invoker.
    pub fn to_snapshot(&self) -> PositionSnapshot {
        PositionSnapshot::new(self.fen.clone(), self.legal_moves.clone(), self.player_color)
    }
}

/// Corpus loading errors. Fatal at harness startup.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The corpus file could not be read at all.
    #[error("failed to read corpus file {path}: {source}")]
    Unreadable {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file was readable but yielded no usable records.
    #[error("corpus file {path} contains no usable records")]
    Empty {
        /// Path that was loaded.
        path: PathBuf,
    },
}

/// A loaded, read-only corpus.
#[derive(Debug, Clone)]
pub struct Corpus {
    records: Vec<TestCaseRecord>,
    skipped: usize,
}

/// The records chosen for one run, with sampling bookkeeping.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Records to evaluate, in corpus order or sampled order.
    pub records: Vec<TestCaseRecord>,
    /// Whether a strict subset was sampled.
    pub sampled: bool,
    /// Full corpus size before sampling.
    pub original_total: usize,
}

impl Corpus {
    /// Load a corpus from a JSONL file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| CorpusError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (line_num, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<TestCaseRecord>(line) {
                Ok(record) if record.legal_moves.is_empty() => {
                    warn!(line = line_num + 1, "skipping record with no legal moves");
                    skipped += 1;
                }
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(line = line_num + 1, %err, "skipping malformed corpus line");
                    skipped += 1;
                }
            }
        }

        if records.is_empty() {
            return Err(CorpusError::Empty {
                path: path.to_path_buf(),
            });
        }

        Ok(Self { records, skipped })
    }

    /// Build a corpus from in-memory records. Used by tests and callers that
    /// assemble positions themselves.
    pub fn from_records(records: Vec<TestCaseRecord>) -> Self {
        Self {
            records,
            skipped: 0,
        }
    }

    /// Number of usable records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records were loaded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Lines skipped during loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// All records in corpus order.
    pub fn records(&self) -> &[TestCaseRecord] {
        &self.records
    }

    /// Choose the records for a run.
    ///
    /// With `sample_size = Some(k)` and `k < len`, draws `k` distinct records
    /// uniformly without replacement; `k >= len` runs the full corpus and is
    /// not considered sampled. A seed makes the draw reproducible.
    pub fn select(&self, sample_size: Option<usize>, seed: Option<u64>) -> Selection {
        let total = self.records.len();
        match sample_size {
            Some(k) if k < total => {
                let mut rng: StdRng = match seed {
                    Some(s) => StdRng::seed_from_u64(s),
                    None => StdRng::from_entropy(),
                };
                let records = sample_without_replacement(&mut rng, &self.records, k);
                Selection {
                    records,
                    sampled: true,
                    original_total: total,
                }
            }
            _ => Selection {
                records: self.records.clone(),
                sampled: false,
                original_total: total,
            },
        }
    }
}

/// Draw `k` distinct records in draw order.
fn sample_without_replacement<R: Rng>(
    rng: &mut R,
    records: &[TestCaseRecord],
    k: usize,
) -> Vec<TestCaseRecord> {
    rand::seq::index::sample(rng, records.len(), k)
        .iter()
        .map(|i| records[i].clone())
        .collect()
}
