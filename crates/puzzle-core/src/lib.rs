//! Core types for chess puzzle mining.
//!
//! This crate provides the data model shared across the mining pipeline:
//! - [`GameRecord`] and [`EvaluatedGame`] for parsed corpus games
//! - [`EvalResult`] and the mate-score conventions
//! - [`Judgment`] and [`AnnotationEntry`] for per-ply swing classification
//! - [`PuzzleCandidate`] and [`AnnotatedGame`] for miner output
//! - content fingerprinting for stable candidate ids

mod fingerprint;
mod game;
mod judgment;
mod puzzle;
mod score;

pub use fingerprint::{game_fingerprint, puzzle_fingerprint};
pub use game::{EvaluatedGame, GameRecord, OpeningInfo};
pub use judgment::{AnnotationEntry, Judgment, JudgmentKind};
pub use puzzle::{AnnotatedGame, AnnotatedOpening, PuzzleCandidate, PuzzleSource, SideToMove};
pub use score::{is_decided, mate_score, EvalResult, MATE_CEILING};
