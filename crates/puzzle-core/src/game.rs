//! Parsed corpus game records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single game parsed from a PGN corpus.
///
/// Immutable once produced by the stream parser. Headers are kept in a
/// sorted map so that serializing them is deterministic, which the
/// content fingerprint relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// PGN tag pairs (`ECO`, `Opening`, `UTCDate`, ...). Keys are
    /// case-sensitive.
    pub headers: BTreeMap<String, String>,
    /// Mainline moves in algebraic notation, one token per ply.
    pub moves: Vec<String>,
}

impl GameRecord {
    /// Creates a record from header pairs and move tokens.
    pub fn new(headers: BTreeMap<String, String>, moves: Vec<String>) -> Self {
        Self { headers, moves }
    }

    /// Looks up a header value by tag name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// The game's ECO opening code, if tagged.
    pub fn eco(&self) -> Option<&str> {
        self.header("ECO")
    }
}

/// Opening classification attached to a pre-evaluated game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningInfo {
    /// ECO code, e.g. `A00`.
    pub eco: String,
    /// Human-readable opening name.
    #[serde(default)]
    pub name: String,
}

/// A game from a line-delimited JSON corpus that already carries a
/// per-ply evaluation trace.
///
/// These records are consumed by the mistake miner; no live engine calls
/// are made for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedGame {
    /// Source identifier of the game.
    pub id: String,
    /// Opening classification, absent for untagged games.
    #[serde(default)]
    pub opening: Option<OpeningInfo>,
    /// Space-joined move tokens.
    #[serde(default)]
    pub moves: String,
    /// Per-ply evaluations in centipawns, parallel to the move list.
    #[serde(default)]
    pub evals: Option<Vec<i32>>,
}

impl EvaluatedGame {
    /// Splits the space-joined move string into tokens.
    pub fn move_tokens(&self) -> Vec<&str> {
        self.moves.split_whitespace().collect()
    }
}
