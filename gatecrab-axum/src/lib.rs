//! # Gatecrab Axum
//!
//! Axum middleware binding for the [`gatecrab`] admission-control
//! library. Decides, for every inbound HTTP request, whether it may
//! proceed or must be rejected with `429 Too Many Requests`, based on
//! per-client and per-account quotas.
//!
//! ## Gates
//!
//! Two gates compose into a pipeline:
//!
//! 1. [`tiered::tiered_limit`] runs pipeline-wide, ahead of everything
//!    else. It classifies the caller as authenticated (via the session
//!    collaborator and the `x-session-id` header) or anonymous, and
//!    applies the tier's fixed-window quota keyed by account or client
//!    identity respectively.
//! 2. [`action::enforce`] runs on individual routes that declare a
//!    bespoke [`ActionThrottle`]: a sliding-window cap for sensitive
//!    or expensive endpoints such as account activation.
//!
//! Identity-enumeration-sensitive endpoints (for example "is this
//! email registered") can additionally attach
//! [`tiered::check_endpoint_limit`], a stricter fixed-window policy
//! keyed by client identity regardless of authentication state.
//!
//! ## Wiring
//!
//! ```no_run
//! use axum::{Router, middleware::from_fn_with_state, routing::post};
//! use gatecrab::AdmissionGate;
//! use gatecrab_axum::{
//!     ActionThrottle, StaticSettings, ThrottleConfig, TieredLimiter,
//!     session::NoSessions,
//! };
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//!
//! # async fn activate() {}
//! let gate = Arc::new(AdmissionGate::new());
//! let config = ThrottleConfig::new(Arc::new(StaticSettings::new()));
//! let limiter = Arc::new(TieredLimiter::new(
//!     Arc::clone(&gate),
//!     config.clone(),
//!     Arc::new(NoSessions),
//! ));
//!
//! let activation = Arc::new(
//!     ActionThrottle::new(Arc::clone(&gate), config, "accounts", "activate")
//!         .window_ms(5_000)
//!         .limit(3)
//!         .per_client(true),
//! );
//!
//! let app: Router = Router::new()
//!     .route(
//!         "/accounts/activate",
//!         post(activate).layer(from_fn_with_state(activation, gatecrab_axum::action::enforce)),
//!     )
//!     .layer(from_fn_with_state(limiter, gatecrab_axum::tiered::tiered_limit));
//! ```
//!
//! The router must be served with
//! `into_make_service_with_connect_info::<SocketAddr>()` so the
//! socket-address fallback of the identity chain has something to read.
//!
//! ## Failure semantics
//!
//! Everything in this crate fails open. Absent or malformed
//! configuration resolves to documented defaults; malformed headers
//! fall through the identification chain to `unknown`; a limit breach
//! is a decision, not an error. A broken rate limiter must never become
//! a denial-of-service vector against the service's own users.

pub mod action;
pub mod config;
pub mod identity;
pub mod session;
pub mod tiered;

#[cfg(feature = "test-endpoints")]
pub mod admin;

pub use action::ActionThrottle;
pub use config::{EnvSettings, SettingsProvider, StaticSettings, ThrottleConfig};
pub use session::SessionResolver;
pub use tiered::TieredLimiter;
