//! Swing detection over game streams.
//!
//! This crate holds the mining stages of the pipeline.
//! [`GameAnnotator`] walks a game ply by ply against a live
//! [`Engine`](puzzle_engine::Engine), classifying the first qualifying
//! evaluation swing, while [`mine_game`] scans games that already carry
//! an evaluation trace. Downstream, [`Deduper`] suppresses repeated
//! candidates by id and [`Reservoir`] draws a uniform random sample from
//! a stream of unknown length.

mod annotator;
mod dedupe;
mod miner;
mod sample;
mod san;

pub use annotator::{AnnotateError, GameAnnotator, MAX_ANALYZED_PLIES};
pub use dedupe::Deduper;
pub use miner::{mine_game, MineError, MINE_SWING};
pub use sample::Reservoir;
