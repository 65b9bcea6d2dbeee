//! Evaluation scores and the mate-score convention.

use serde::{Deserialize, Serialize};

/// Ceiling used to encode mate distances as centipawn-comparable scores.
///
/// A mate in N plies becomes `±(MATE_CEILING - N)`, so a mate-in-1
/// outranks any finite centipawn evaluation while closer mates still
/// compare above more distant ones.
pub const MATE_CEILING: i32 = 30_000;

/// Result of evaluating a single position at a requested depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Signed score in centipawns, mate distances remapped near
    /// [`MATE_CEILING`]. Sign follows the side to move.
    pub score: i32,
    /// Best move token reported by the evaluator, empty if none.
    pub best_move: String,
}

impl EvalResult {
    /// Creates a result from a raw score and best move.
    pub fn new(score: i32, best_move: impl Into<String>) -> Self {
        Self {
            score,
            best_move: best_move.into(),
        }
    }
}

/// Remaps a mate distance to the centipawn-comparable encoding.
pub fn mate_score(distance: i32) -> i32 {
    if distance > 0 {
        MATE_CEILING - distance
    } else {
        -MATE_CEILING - distance
    }
}

/// Whether a score has reached the mate-encoded ceiling, i.e. the
/// position is already decided and further analysis is meaningless.
pub fn is_decided(score: i32) -> bool {
    score.saturating_abs() >= MATE_CEILING
}
