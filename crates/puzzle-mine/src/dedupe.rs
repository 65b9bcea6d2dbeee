//! Duplicate suppression over candidate streams.

use puzzle_core::PuzzleCandidate;
use std::collections::HashSet;

/// Tracks candidate ids already seen and drops repeats.
///
/// Because candidate ids are content fingerprints, the same position and
/// best move mined from different games collapse to one entry. First
/// occurrence wins.
#[derive(Debug, Default)]
pub struct Deduper {
    seen: HashSet<String>,
}

impl Deduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes a candidate through if its id has not been seen before.
    pub fn filter(&mut self, candidate: PuzzleCandidate) -> Option<PuzzleCandidate> {
        if self.seen.insert(candidate.id.clone()) {
            Some(candidate)
        } else {
            None
        }
    }

    /// Number of distinct ids admitted so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
