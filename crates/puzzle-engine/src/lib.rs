//! Evaluation engines for the puzzle mining pipeline.
//!
//! Two interchangeable implementations of the [`Engine`] capability.
//! [`PoolEngine`] is a fixed-size pool of in-process worker threads
//! running a shallow material search; calls are independent and a failed
//! worker only fails its own request. [`UciEngine`] wraps a single
//! long-lived UCI subprocess (e.g. Stockfish); requests are serialized
//! through a response-matching state machine, with only one evaluation
//! in flight at a time.
//!
//! Callers hold a `dyn Engine` and never branch on the variant.

pub mod eval;
pub mod pool;
pub mod uci;

use async_trait::async_trait;
use puzzle_core::EvalResult;
use thiserror::Error;

pub use pool::PoolEngine;
pub use uci::UciEngine;

/// Errors that can occur when evaluating positions.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or perform I/O on its pipes.
    #[error("Failed to spawn engine: {0}")]
    Spawn(#[from] std::io::Error),
    /// The UCI handshake did not complete.
    #[error("Engine initialization failed")]
    InitFailed,
    /// The engine closed its output before completing a response.
    #[error("Engine closed unexpectedly")]
    Closed,
    /// The engine produced an unparseable response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    /// The position could not be set up from the given FEN.
    #[error("Invalid position: {0}")]
    InvalidPosition(String),
    /// The evaluation worker that held this request is gone.
    #[error("Evaluation worker unavailable")]
    WorkerGone,
}

/// A position evaluator reachable at a requested search depth.
///
/// The single capability the annotator depends on. Implementations must
/// be safe to share across a pipeline driving many games.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Scores the position given in FEN at the requested depth.
    async fn evaluate(&self, fen: &str, depth: u32) -> Result<EvalResult, EngineError>;

    /// Releases engine resources: terminates the subprocess or drains
    /// and stops the worker pool. Evaluations after shutdown fail.
    async fn shutdown(&self);
}
