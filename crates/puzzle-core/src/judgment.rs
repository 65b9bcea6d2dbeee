//! Swing classification for annotated plies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest swing (in centipawns) that earns a judgment at all.
pub const INACCURACY_SWING: i32 = 15;
/// Swing threshold for a mistake.
pub const MISTAKE_SWING: i32 = 50;
/// Swing threshold for a blunder.
pub const BLUNDER_SWING: i32 = 100;

/// Severity of an evaluation swing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JudgmentKind {
    /// Swing of at least 15 and below 50 centipawns.
    Inaccuracy,
    /// Swing of at least 50 and below 100 centipawns.
    Mistake,
    /// Swing of at least 100 centipawns.
    Blunder,
}

impl JudgmentKind {
    /// Classifies an absolute evaluation swing, largest threshold first.
    ///
    /// Swings below 15 centipawns are not judged.
    pub fn from_swing(swing: i32) -> Option<Self> {
        if swing >= BLUNDER_SWING {
            Some(Self::Blunder)
        } else if swing >= MISTAKE_SWING {
            Some(Self::Mistake)
        } else if swing >= INACCURACY_SWING {
            Some(Self::Inaccuracy)
        } else {
            None
        }
    }
}

impl fmt::Display for JudgmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inaccuracy => write!(f, "Inaccuracy"),
            Self::Mistake => write!(f, "Mistake"),
            Self::Blunder => write!(f, "Blunder"),
        }
    }
}

/// A judgment attached to the first qualifying ply of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Judgment {
    /// Severity label.
    pub name: JudgmentKind,
    /// Human-readable comment, e.g. `"Blunder. Qxf7 was best."`.
    pub comment: String,
}

impl Judgment {
    /// Builds the judgment for a classified swing.
    pub fn new(kind: JudgmentKind, best_move: &str) -> Self {
        Self {
            name: kind,
            comment: format!("{}. {} was best.", kind, best_move),
        }
    }
}

/// One analyzed ply: the evaluation after the move, the evaluator's best
/// move, and an optional judgment on the swing it caused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEntry {
    /// Evaluation score after this ply.
    pub eval: i32,
    /// Best move reported for the resulting position.
    pub best: String,
    /// Judgment, present only on the ply that terminated analysis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgment: Option<Judgment>,
}
