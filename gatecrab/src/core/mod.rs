//! Core components of the gatecrab admission-control library
//!
//! This module contains the fundamental building blocks:
//! - [`identity`]: caller identity derivation with a deterministic fallback chain
//! - [`cache`]: the shared keyed counter store with window expiry
//! - [`epoch`]: the monotonically increasing reset generation
//! - [`policy`]: window/limit policy variants
//! - [`gate`]: the unified admission gate evaluated per request

pub mod cache;
pub mod epoch;
pub mod gate;
pub mod identity;
pub mod policy;


pub use cache::{CounterEntry, ThrottleCache, ThrottleCacheBuilder};
pub use epoch::ResetGeneration;
pub use gate::{AdmissionGate, Decision};
pub use identity::ClientIdentity;
pub use policy::{GatePolicy, WindowMode};
