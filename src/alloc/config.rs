//! Arena sizing parameters and the batch growth schedule.

use serde::{Deserialize, Serialize};

/// Configuration for an [`Arena`](super::Arena).
///
/// `capacity` sizes the first batch (zero defers allocation to the first
/// request). `growth_threshold` is where the schedule switches from doubling
/// to +25% steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Size of the batch allocated at construction.
    pub capacity: usize,
    /// Batch size below which the next batch doubles.
    pub growth_threshold: usize,
}

impl ArenaConfig {
    /// Default switch point between doubling and +25% growth.
    pub const DEFAULT_GROWTH_THRESHOLD: usize = 512;

    /// Config with the given first batch size and the default threshold.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            growth_threshold: Self::DEFAULT_GROWTH_THRESHOLD,
        }
    }

    /// Replaces the growth threshold.
    #[must_use]
    pub fn with_growth_threshold(mut self, growth_threshold: usize) -> Self {
        self.growth_threshold = growth_threshold;
        self
    }

    /// Size of the batch that follows one of `current` slots.
    ///
    /// `buffered` is the capacity the free list already holds; when it exceeds
    /// the computed figure it wins, so a batch is never smaller than the
    /// storage already reserved for it.
    pub fn next_batch_size(&self, current: usize, buffered: usize) -> usize {
        let mut line = if current < self.growth_threshold {
            current.saturating_mul(2)
        } else {
            current.saturating_add(current >> 2)
        };

        if line == 0 {
            line = 1;
        }

        if buffered > line {
            line = buffered;
        }

        line
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(0)
    }
}
