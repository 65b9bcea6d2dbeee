//! Miner output records: puzzle candidates and annotated games.

use crate::judgment::AnnotationEntry;
use serde::{Deserialize, Serialize};

/// Side to move in a puzzle position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SideToMove {
    /// White to move.
    #[serde(rename = "w")]
    White,
    /// Black to move.
    #[serde(rename = "b")]
    Black,
}

/// Where a puzzle candidate was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSource {
    /// Identifier of the source game.
    pub game: String,
    /// Ply index of the triggering move.
    pub ply: usize,
}

/// A position mined from a large evaluation swing.
///
/// Immutable after creation except for `tags`, which later enrichment
/// stages may fill in. The `id` is a deterministic fingerprint of the
/// defining fields so deduplication by id is sound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleCandidate {
    /// Content-derived fingerprint (hash of position + best move).
    pub id: String,
    /// Position before the triggering move, in FEN.
    pub fen: String,
    /// The triggering move token.
    pub best: String,
    /// Side to move in the puzzle position.
    pub side: SideToMove,
    /// ECO code of the source game's opening.
    pub eco: String,
    /// Opening name of the source game.
    pub opening: String,
    /// Evaluation before the triggering move.
    pub eval_before: i32,
    /// Evaluation after the triggering move.
    pub eval_after: i32,
    /// Enrichment tags, empty at creation.
    pub tags: Vec<String>,
    /// Source game and ply.
    pub src: PuzzleSource,
}

/// Opening metadata copied from a game's headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedOpening {
    /// ECO code header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    /// Opening name header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variation header, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,
}

/// A game whose analysis found a judged swing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedGame {
    /// Fingerprint of headers plus move list; stable across reruns.
    pub id: String,
    /// Game timestamp in epoch milliseconds, derived from the date and
    /// time headers when parseable.
    pub created_at: i64,
    /// Opening metadata from the headers.
    pub opening: AnnotatedOpening,
    /// Space-joined move list of the full game.
    pub moves: String,
    /// Per-ply annotations, truncated at the judged ply.
    pub analysis: Vec<AnnotationEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_serialization() {
        assert_eq!(serde_json::to_string(&SideToMove::White).unwrap(), "\"w\"");
        assert_eq!(serde_json::to_string(&SideToMove::Black).unwrap(), "\"b\"");
    }

    #[test]
    fn test_candidate_roundtrip() {
        let candidate = PuzzleCandidate {
            id: "deadbeef".to_string(),
            fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1".to_string(),
            best: "e4".to_string(),
            side: SideToMove::White,
            eco: "A00".to_string(),
            opening: "Start".to_string(),
            eval_before: 0,
            eval_after: 250,
            tags: vec![],
            src: PuzzleSource {
                game: "g1".to_string(),
                ply: 3,
            },
        };
        let json = serde_json::to_string(&candidate).unwrap();
        let back: PuzzleCandidate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candidate);
    }
}
