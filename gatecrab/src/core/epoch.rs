//! Reset generation (epoch) service
//!
//! Resetting throttle state for operational or test purposes must not
//! require enumerating and deleting a large, concurrently mutated
//! counter map. Instead, every partition key embeds the generation at
//! the time it was computed; bumping the generation makes all
//! previously computed keys permanently unreachable, and the old
//! entries expire on their own TTL.

use std::sync::atomic::{AtomicU64, Ordering};

/// A monotonically increasing epoch counter
///
/// Starts at 0 and only moves forward via [`reset`](Self::reset).
/// Reads and increments are sequentially consistent: once a reset has
/// committed, no caller observes the pre-reset generation as current.
///
/// Wraparound would take 2^64 resets; at one reset per nanosecond that
/// is roughly 584 years of continuous resetting, so overflow is treated
/// as a non-issue.
///
/// # Example
///
/// ```
/// use gatecrab::ResetGeneration;
///
/// let generation = ResetGeneration::new();
/// assert_eq!(generation.generation(), 0);
/// assert_eq!(generation.reset(), 1);
/// assert_eq!(generation.generation(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ResetGeneration {
    current: AtomicU64,
}

impl ResetGeneration {
    /// Create a new generation counter starting at 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only snapshot of the current generation
    pub fn generation(&self) -> u64 {
        self.current.load(Ordering::SeqCst)
    }

    /// Atomically advance to the next generation, returning it
    pub fn reset(&self) -> u64 {
        self.current.fetch_add(1, Ordering::SeqCst) + 1
    }
}
