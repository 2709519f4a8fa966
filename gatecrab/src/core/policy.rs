//! Gate policy variants
//!
//! Historically this subsystem carried two parallel limiter
//! implementations (a per-action filter with its own cache, and a
//! pipeline-wide limiter with partition callbacks). They are unified
//! here behind one [`AdmissionGate`](crate::AdmissionGate) taking a
//! tagged [`GatePolicy`], so one counter store serves both shapes.

use std::time::Duration;

/// How a counter's window behaves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Expiry is pushed forward by every observation; an idle period
    /// longer than the window resets the counter
    Sliding,
    /// Expiry is anchored at the window start; the counter resets at
    /// the boundary regardless of traffic shape
    Fixed,
}

/// An immutable window/limit policy attached to a gate evaluation
///
/// Multiple endpoints may share identical policy shapes while keeping
/// independent state, because state is keyed by scope and subject, not
/// by the policy value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Per-endpoint sliding-expiry cap, used for bespoke endpoint
    /// limits such as account activation or password reset
    PerActionSliding {
        /// Counting window; also the idle period after which the
        /// counter silently resets
        window: Duration,
        /// Accepted requests per window; the request that would push
        /// the count past this is rejected
        limit: i64,
        /// When false the counter is shared by all callers (a global
        /// cap protecting a shared resource rather than a per-caller
        /// fairness mechanism)
        per_client: bool,
    },
    /// Pipeline-wide fixed-window quota, used for the authenticated
    /// and anonymous tiers and the stricter check-endpoint policy
    TieredFixed {
        /// Window length; the counter replenishes fully at each boundary
        period: Duration,
        /// Accepted requests per period
        limit: i64,
    },
}

impl GatePolicy {
    /// The counting window duration
    pub fn window(&self) -> Duration {
        match self {
            GatePolicy::PerActionSliding { window, .. } => *window,
            GatePolicy::TieredFixed { period, .. } => *period,
        }
    }

    /// The accepted-request cap
    ///
    /// Limits are not validated; a zero or negative limit rejects every
    /// request, matching the un-validated configuration surface.
    pub fn limit(&self) -> i64 {
        match self {
            GatePolicy::PerActionSliding { limit, .. } => *limit,
            GatePolicy::TieredFixed { limit, .. } => *limit,
        }
    }

    /// The window behavior for this policy
    pub fn mode(&self) -> WindowMode {
        match self {
            GatePolicy::PerActionSliding { .. } => WindowMode::Sliding,
            GatePolicy::TieredFixed { .. } => WindowMode::Fixed,
        }
    }

    /// Whether counters are partitioned by caller identity
    ///
    /// Tiered policies are always keyed by an identity; only per-action
    /// policies can opt into a shared global counter.
    pub fn per_client(&self) -> bool {
        match self {
            GatePolicy::PerActionSliding { per_client, .. } => *per_client,
            GatePolicy::TieredFixed { .. } => true,
        }
    }
}
