//! Reservoir sampling for bounded pack sizes.

use rand::Rng;

/// A fixed-capacity uniform sample over a stream of unknown length.
///
/// Standard reservoir sampling: the first `capacity` items fill the
/// reservoir, and each later item replaces a random slot with
/// probability `capacity / seen`. Any single pass yields each stream
/// element with equal probability.
#[derive(Debug)]
pub struct Reservoir<T, R: Rng> {
    capacity: usize,
    items: Vec<T>,
    seen: u64,
    rng: R,
}

impl<T> Reservoir<T, rand::rngs::ThreadRng> {
    /// Creates a reservoir seeded from the thread-local generator.
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, rand::rng())
    }
}

impl<T, R: Rng> Reservoir<T, R> {
    /// Creates a reservoir with an explicit generator, so sampling can
    /// be made deterministic.
    pub fn with_rng(capacity: usize, rng: R) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity),
            seen: 0,
            rng,
        }
    }

    /// Offers one item to the reservoir.
    pub fn push(&mut self, item: T) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
            return;
        }
        let slot = self.rng.random_range(0..self.seen);
        if (slot as usize) < self.capacity {
            self.items[slot as usize] = item;
        }
    }

    /// Total items offered so far, including rejected ones.
    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Consumes the reservoir, returning the retained sample.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
