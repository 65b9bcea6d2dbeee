//! Content fingerprints for puzzle identity.
//!
//! Candidate ids must be deterministic functions of their defining fields
//! so that deduplication by id is correct and reruns over the same corpus
//! reproduce the same ids.

use crate::game::GameRecord;
use sha2::{Digest, Sha256};

fn digest(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint of a full game: serialized headers plus the space-joined
/// move list. Headers live in a sorted map, so the serialization is
/// stable regardless of tag order in the source PGN.
pub fn game_fingerprint(game: &GameRecord) -> String {
    // Header serialization of a BTreeMap cannot fail.
    let headers = serde_json::to_string(&game.headers).unwrap_or_default();
    digest(&format!("{}{}", headers, game.moves.join(" ")))
}

/// Fingerprint of a mined position: FEN plus the triggering move.
pub fn puzzle_fingerprint(fen: &str, best_move: &str) -> String {
    digest(&format!("{}{}", fen, best_move))
}
