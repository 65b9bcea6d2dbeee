//! Streaming corpus input for the puzzle mining pipeline.
//!
//! [`PgnStream`] parses PGN text incrementally, one [`GameRecord`] at a
//! time, and [`NdjsonStream`] reads line-delimited JSON games with an
//! optional cap. [`open_corpus`] selects the input source: a local file,
//! an `http(s)` URL, standard input, or a `.zst` stream. [`EcoPartitioner`]
//! fans games out to per-opening-code files with progress reporting, and
//! [`Shutdown`] is the cancellation token the pipeline loops poll.
//!
//! All streams are lazy, finite, and non-restartable; nothing buffers
//! more than the game currently being assembled.
//!
//! [`GameRecord`]: puzzle_core::GameRecord

mod ndjson;
mod partition;
mod pgn;
mod shutdown;
mod source;

pub use ndjson::NdjsonStream;
pub use partition::{EcoPartitioner, PartitionConfig, PartitionSummary};
pub use pgn::PgnStream;
pub use shutdown::Shutdown;
pub use source::{open_corpus, CorpusReader};

use thiserror::Error;

/// Errors surfaced by corpus streams and the partitioner.
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading the corpus or writing a partition file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A corpus line was not valid JSON.
    #[error("Malformed JSON game: {0}")]
    Json(#[from] serde_json::Error),
    /// Fetching a remote corpus failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
