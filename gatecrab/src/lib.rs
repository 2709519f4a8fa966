//! # Gatecrab
//!
//! In-process admission control for HTTP services: keyed time-window
//! request counters with O(1) epoch-based reset.
//!
//! ## Overview
//!
//! Gatecrab decides, for every unit of inbound work, whether it may
//! proceed or must be rejected based on how many requests the same
//! partition has already produced inside a time window. It provides:
//!
//! - **One shared counter store** per process, safe under concurrent
//!   request handling
//! - **Two window shapes**: sliding-expiry windows for per-action
//!   burst protection, fixed windows for steady-state throughput caps
//! - **Epoch-based reset**: invalidate every outstanding counter in
//!   O(1) without enumerating them
//! - **Fail-open totality**: no admission check can error or panic the
//!   process; a limit breach is an outcome, not an exception
//!
//! ## Quick Start
//!
//! ```
//! use gatecrab::{AdmissionGate, GatePolicy};
//! use std::time::{Duration, SystemTime};
//!
//! let gate = AdmissionGate::new();
//!
//! // 3 requests per 5 seconds, per caller, sliding expiry
//! let policy = GatePolicy::PerActionSliding {
//!     window: Duration::from_secs(5),
//!     limit: 3,
//!     per_client: true,
//! };
//!
//! let decision = gate.check("accounts.activate", "client:mobile-1", &policy, SystemTime::now());
//! assert!(decision.allowed);
//! ```
//!
//! ## Partition Keys
//!
//! Every counter is scoped by a composite key built from a *scope* (the
//! action or tier name), a *subject* (client or account identity), and
//! the current reset generation:
//!
//! ```text
//! accounts.activate:client:mobile-1:g0
//! tier.anonymous:ip:203.0.113.9:g0
//! tier.authorized:account:42:g3
//! ```
//!
//! Bumping the generation with [`AdmissionGate::reset`] makes every
//! previously computed key unreachable; stale entries simply age out on
//! their own TTL. See [`ResetGeneration`] for the mechanics.
//!
//! ## Window Shapes
//!
//! [`GatePolicy::PerActionSliding`] pushes the counter's expiry forward
//! on every observation: sustained under-limit traffic keeps the
//! counter alive indefinitely, while a quiet period longer than the
//! window silently resets it. This punishes bursts against a specific
//! endpoint.
//!
//! [`GatePolicy::TieredFixed`] never extends the window: once the
//! period elapses from the first observation, the counter resets
//! regardless of traffic shape. This bounds steady-state throughput
//! per identity with automatic replenishment.
//!
//! ## Counting Past the Limit
//!
//! A rejected request still increments its counter. Repeated hammering
//! keeps the stored count rising rather than stalling at the limit, so
//! logs and diagnostics reflect true offered load. The
//! [`Decision::first_rejection`] flag fires exactly once per burst
//! (when the count first exceeds the limit) so callers can log without
//! flooding.
//!
//! ## Thread Safety
//!
//! [`AdmissionGate`] is internally synchronized and intended to be
//! shared behind an `Arc` by every concurrent request handler. Each
//! check performs one fetch-or-create/increment/write-back under a
//! single short critical section; keys are independent, so no broader
//! locking is needed.
//!
//! ## Features
//!
//! - `ahash` (default): use AHash for faster counter-map hashing

pub mod core;

pub use crate::core::{
    AdmissionGate, ClientIdentity, CounterEntry, Decision, GatePolicy, ResetGeneration,
    ThrottleCache, ThrottleCacheBuilder, WindowMode,
};
