//! Cooperative cancellation for pipeline loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cancellation token passed through the pipeline.
///
/// The orchestrator arms it from a signal handler task; loops poll
/// [`is_triggered`](Self::is_triggered) between items and unwind
/// normally, so teardown (flushing writers, stopping engines) happens in
/// order at the call site rather than inside a global handler.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
}

impl Shutdown {
    /// Creates an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests shutdown. Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_visible_to_clones() {
        let token = Shutdown::new();
        let observer = token.clone();
        assert!(!observer.is_triggered());
        token.trigger();
        assert!(observer.is_triggered());
    }
}
