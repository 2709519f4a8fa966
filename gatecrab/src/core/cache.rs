//! Shared keyed counter store with time-window expiry
//!
//! One [`ThrottleCache`] per process holds every admission counter,
//! regardless of which gate created it. Entries carry their own expiry
//! and are cleaned up opportunistically at a fixed interval, so steady
//! traffic pays no per-request cleanup cost.

use super::policy::WindowMode;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[cfg(feature = "ahash")]
use ahash::AHashMap as HashMap;
#[cfg(not(feature = "ahash"))]
use std::collections::HashMap;

// Configuration constants
const DEFAULT_CAPACITY: usize = 1000;
const CAPACITY_OVERHEAD_FACTOR: f64 = 1.3;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 60;

/// A single counter, owned exclusively by the cache that created it
///
/// `count` strictly reflects the number of observed requests for the
/// entry's partition key since its window began, including requests
/// that were rejected after the count passed the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterEntry {
    /// Observed requests since `window_start`
    pub count: i64,
    /// When the first observation of the current window arrived
    pub window_start: SystemTime,
    /// When the entry stops being visible to reads
    pub expires_at: SystemTime,
}

/// Internally synchronized counter store
///
/// The store is explicitly owned and injected into its consumers
/// (typically inside an [`AdmissionGate`](crate::AdmissionGate) behind
/// an `Arc`), never a process-wide static, so tests can instantiate
/// isolated instances.
///
/// Concurrency: the only mutation discipline admission control needs is
/// atomicity of fetch-or-create/increment/write-back per key, which
/// [`record`](Self::record) provides under one short critical section.
/// Keys are independent; no broader locking is required.
///
/// A poisoned lock is absorbed rather than propagated: counters are
/// advisory state and must never take request handling down with them.
pub struct ThrottleCache {
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    data: HashMap<String, CounterEntry>,
    next_cleanup: SystemTime,
    cleanup_interval: Duration,
}

/// Builder for configuring a [`ThrottleCache`]
///
/// # Example
///
/// ```
/// use gatecrab::ThrottleCache;
/// use std::time::Duration;
///
/// let cache = ThrottleCache::builder()
///     .capacity(100_000)
///     .cleanup_interval(Duration::from_secs(120))
///     .build();
/// ```
pub struct ThrottleCacheBuilder {
    capacity: usize,
    cleanup_interval: Duration,
}

impl ThrottleCache {
    /// Create a cache with default capacity and cleanup interval
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a cache sized for an expected number of unique keys
    ///
    /// Allocates 30% extra space to reduce rehashing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_config(capacity, Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS))
    }

    /// Create a builder for fine-grained configuration
    pub fn builder() -> ThrottleCacheBuilder {
        ThrottleCacheBuilder::new()
    }

    fn with_config(capacity: usize, cleanup_interval: Duration) -> Self {
        ThrottleCache {
            inner: Mutex::new(CacheInner {
                data: HashMap::with_capacity(
                    (capacity as f64 * CAPACITY_OVERHEAD_FACTOR) as usize,
                ),
                next_cleanup: SystemTime::now() + cleanup_interval,
                cleanup_interval,
            }),
        }
    }

    // Recovery is silent: this crate carries no logging facility, so a
    // poisoned lock is simply taken over without a trace event.
    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Atomically observe one request against `key`
    ///
    /// Fetch-or-create, increment, and write back the counter in a
    /// single critical section, then return the updated entry. The
    /// increment is unconditional: callers decide afterwards whether
    /// the resulting count is over their limit, and an over-limit entry
    /// keeps counting rather than freezing.
    ///
    /// Window behavior per [`WindowMode`]:
    /// - `Sliding`: every observation pushes `expires_at` to
    ///   `now + window`; an expired entry restarts at count 1
    /// - `Fixed`: `expires_at` stays anchored at
    ///   `window_start + window`; when the boundary passes, the next
    ///   observation restarts the window at count 1
    pub fn record(
        &self,
        key: &str,
        mode: WindowMode,
        window: Duration,
        now: SystemTime,
    ) -> CounterEntry {
        let fresh = CounterEntry {
            count: 1,
            window_start: now,
            expires_at: now + window,
        };

        let mut inner = self.lock();
        inner.maybe_clean_expired(now);

        let entry = inner
            .data
            .entry(key.to_string())
            .and_modify(|entry| {
                if entry.expires_at > now {
                    entry.count += 1;
                    if mode == WindowMode::Sliding {
                        entry.expires_at = now + window;
                    }
                } else {
                    // Window lapsed: the next observation restarts it
                    *entry = fresh;
                }
            })
            .or_insert(fresh);
        *entry
    }

    /// Read a counter, treating expired entries as absent
    pub fn get(&self, key: &str, now: SystemTime) -> Option<CounterEntry> {
        let inner = self.lock();
        match inner.data.get(key) {
            Some(entry) if entry.expires_at > now => Some(*entry),
            _ => None,
        }
    }

    /// Insert or replace a counter wholesale
    ///
    /// Normal admission traffic goes through [`record`](Self::record);
    /// this exists for maintenance and test tooling.
    pub fn set(&self, key: &str, entry: CounterEntry) {
        self.lock().data.insert(key.to_string(), entry);
    }

    /// Remove a single counter
    pub fn remove(&self, key: &str) -> Option<CounterEntry> {
        self.lock().data.remove(key)
    }

    /// Atomically discard every counter
    ///
    /// Intended for maintenance and test tooling. Operational resets
    /// prefer bumping the generation instead, which needs no
    /// enumeration and composes safely under concurrent access.
    pub fn reset_all(&self) {
        self.lock().data.clear();
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.lock().data.len()
    }

    /// Whether the store holds no entries at all
    pub fn is_empty(&self) -> bool {
        self.lock().data.is_empty()
    }
}

impl Default for ThrottleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheInner {
    fn maybe_clean_expired(&mut self, now: SystemTime) {
        // Clean periodically based on time, not on every operation
        if now >= self.next_cleanup {
            self.data.retain(|_, entry| entry.expires_at > now);
            self.next_cleanup = now + self.cleanup_interval;
        }
    }
}

impl Default for ThrottleCacheBuilder {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_SECS),
        }
    }
}

impl ThrottleCacheBuilder {
    /// Create a builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expected number of unique keys
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the interval between opportunistic purges of expired entries
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Build the cache with the configured settings
    pub fn build(self) -> ThrottleCache {
        ThrottleCache::with_config(self.capacity, self.cleanup_interval)
    }
}
