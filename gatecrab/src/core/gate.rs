//! The unified admission gate
//!
//! One [`AdmissionGate`] serves every admission check in the process:
//! per-action sliding caps and pipeline-wide tiered quotas alike. Each
//! check builds a partition key from its scope, its subject, and the
//! current reset generation, records one hit, and turns the resulting
//! count into a [`Decision`].

use super::cache::ThrottleCache;
use super::epoch::ResetGeneration;
use super::policy::GatePolicy;
use std::time::SystemTime;

/// Outcome of one admission check
///
/// A denied request is a normal, expected outcome, not an error; the
/// caller short-circuits the pipeline without invoking business logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Observed requests for this partition in the current window,
    /// including this one and any previously rejected ones
    pub count: i64,
    /// The policy limit the count was compared against
    pub limit: i64,
    /// True exactly when the count first exceeds the limit, so callers
    /// can log one line per burst instead of flooding
    pub first_rejection: bool,
}

/// Shared admission-control state: one counter store and one reset
/// generation
///
/// Created once at process start, shared behind an `Arc` by every gate
/// evaluation, torn down at shutdown, and reset only via explicit API.
///
/// # Example
///
/// ```
/// use gatecrab::{AdmissionGate, GatePolicy};
/// use std::time::{Duration, SystemTime};
///
/// let gate = AdmissionGate::new();
/// let policy = GatePolicy::TieredFixed {
///     period: Duration::from_secs(60),
///     limit: 100,
/// };
///
/// let decision = gate.check("tier.anonymous", "ip:203.0.113.9", &policy, SystemTime::now());
/// assert!(decision.allowed);
/// assert_eq!(decision.count, 1);
/// ```
pub struct AdmissionGate {
    cache: ThrottleCache,
    generation: ResetGeneration,
}

impl AdmissionGate {
    /// Create a gate with a default-sized counter store
    pub fn new() -> Self {
        Self::with_cache(ThrottleCache::new())
    }

    /// Create a gate around an explicitly configured counter store
    pub fn with_cache(cache: ThrottleCache) -> Self {
        AdmissionGate {
            cache,
            generation: ResetGeneration::new(),
        }
    }

    /// Evaluate one request against a policy
    ///
    /// `scope` names the gate (an action like `accounts.activate` or a
    /// tier like `tier.anonymous`); `subject` is the caller or account
    /// identity the counter is partitioned by. The partition key is
    /// `"{scope}:{subject}:g{generation}"`, so distinct scopes never
    /// share a counter even when their subjects coincide, and a
    /// generation bump makes every outstanding key unreachable.
    ///
    /// The hit is recorded whether or not the request ends up allowed;
    /// this operation is total and never blocks beyond one short
    /// critical section on the store.
    pub fn check(
        &self,
        scope: &str,
        subject: &str,
        policy: &GatePolicy,
        now: SystemTime,
    ) -> Decision {
        let key = format!("{scope}:{subject}:g{}", self.generation.generation());
        let entry = self.cache.record(&key, policy.mode(), policy.window(), now);
        let limit = policy.limit();

        Decision {
            allowed: entry.count <= limit,
            count: entry.count,
            limit,
            first_rejection: entry.count == limit + 1,
        }
    }

    /// Current reset generation
    pub fn generation(&self) -> u64 {
        self.generation.generation()
    }

    /// Invalidate every outstanding counter in O(1)
    ///
    /// Bumps the generation; subsequent checks compute fresh partition
    /// keys and the stale entries age out on their own expiry. Returns
    /// the new generation.
    pub fn reset(&self) -> u64 {
        self.generation.reset()
    }

    /// Discard all stored counters immediately
    ///
    /// Heavier than [`reset`](Self::reset); kept for maintenance and
    /// test tooling that wants the memory back right away.
    pub fn clear(&self) {
        self.cache.reset_all();
    }

    /// The underlying counter store
    pub fn cache(&self) -> &ThrottleCache {
        &self.cache
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new()
    }
}
