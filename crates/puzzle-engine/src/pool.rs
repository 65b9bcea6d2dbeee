//! Fixed-size pool of in-process evaluation workers.

use crate::{eval, Engine, EngineError};
use async_trait::async_trait;
use puzzle_core::EvalResult;
use std::sync::Mutex;
use tokio::sync::oneshot;

struct Job {
    fen: String,
    depth: u32,
    reply: oneshot::Sender<Result<EvalResult, EngineError>>,
}

/// An [`Engine`] backed by a pool of worker threads, each running the
/// in-process evaluator from [`eval`].
///
/// Every call is dispatched independently to whichever worker picks the
/// job up first; there is no ordering guarantee between concurrent
/// calls. A worker that dies takes down only the request it held: its
/// reply channel is dropped and the caller sees
/// [`EngineError::WorkerGone`], while the remaining workers keep
/// serving.
pub struct PoolEngine {
    // Taken on shutdown so the channel disconnects and workers drain.
    sender: Mutex<Option<crossbeam_channel::Sender<Job>>>,
    workers: usize,
}

impl PoolEngine {
    /// Starts `workers` evaluation threads.
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        let (sender, receiver) = crossbeam_channel::unbounded::<Job>();

        for i in 0..workers {
            let receiver = receiver.clone();
            std::thread::spawn(move || {
                tracing::debug!(worker = i, "evaluation worker started");
                while let Ok(job) = receiver.recv() {
                    let result = eval::evaluate(&job.fen, job.depth);
                    // Caller may have gone away; nothing to do then.
                    let _ = job.reply.send(result);
                }
                tracing::debug!(worker = i, "evaluation worker stopped");
            });
        }

        Self {
            sender: Mutex::new(Some(sender)),
            workers,
        }
    }

    /// Number of worker threads the pool was started with.
    pub fn workers(&self) -> usize {
        self.workers
    }

    fn sender(&self) -> Result<crossbeam_channel::Sender<Job>, EngineError> {
        self.sender
            .lock()
            .map_err(|_| EngineError::WorkerGone)?
            .clone()
            .ok_or(EngineError::WorkerGone)
    }
}

#[async_trait]
impl Engine for PoolEngine {
    async fn evaluate(&self, fen: &str, depth: u32) -> Result<EvalResult, EngineError> {
        let sender = self.sender()?;
        let (reply_tx, reply_rx) = oneshot::channel();
        sender
            .send(Job {
                fen: fen.to_string(),
                depth,
                reply: reply_tx,
            })
            .map_err(|_| EngineError::WorkerGone)?;
        reply_rx.await.map_err(|_| EngineError::WorkerGone)?
    }

    async fn shutdown(&self) {
        if let Ok(mut guard) = self.sender.lock() {
            guard.take();
        }
    }
}
