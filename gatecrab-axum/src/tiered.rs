//! Pipeline-wide tiered rate limiting
//!
//! Every inbound request passes through [`tiered_limit`] before any
//! action-specific gate. The caller is classified into the
//! authenticated or anonymous tier via the session collaborator, and
//! the tier's fixed-window quota is applied, keyed by account identity
//! or client identity respectively.
//!
//! Fixed windows (vs the sliding windows of
//! [`ActionThrottle`](crate::ActionThrottle)) bound steady-state
//! throughput per identity: the window never extends on activity and
//! replenishes fully at each boundary, rather than punishing bursts.

use crate::config::ThrottleConfig;
use crate::identity::identify;
use crate::session::{SESSION_ID_HEADER, SessionResolver};
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use gatecrab::{AdmissionGate, Decision, GatePolicy};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::warn;

/// Scope for the authenticated tier's counters
pub const AUTHORIZED_SCOPE: &str = "tier.authorized";
/// Scope for the anonymous tier's counters
pub const ANONYMOUS_SCOPE: &str = "tier.anonymous";
/// Scope for the stricter check-endpoint policy
pub const CHECK_ENDPOINT_SCOPE: &str = "policy.check-endpoint";

/// Shared state for the tiered limiter middleware
///
/// Holds the process-wide [`AdmissionGate`], the hot-read configuration
/// view, and the session collaborator. Cheap to share behind an `Arc`.
pub struct TieredLimiter {
    gate: Arc<AdmissionGate>,
    config: ThrottleConfig,
    sessions: Arc<dyn SessionResolver>,
}

impl TieredLimiter {
    pub fn new(
        gate: Arc<AdmissionGate>,
        config: ThrottleConfig,
        sessions: Arc<dyn SessionResolver>,
    ) -> Self {
        TieredLimiter {
            gate,
            config,
            sessions,
        }
    }

    /// The gate this limiter evaluates against
    pub fn gate(&self) -> &Arc<AdmissionGate> {
        &self.gate
    }

    fn period(&self) -> Duration {
        // Type coercion only: a negative period clamps to zero, which
        // expires every window immediately.
        Duration::from_secs(self.config.period_in_seconds().max(0) as u64)
    }

    fn account_for(&self, request: &Request) -> Option<String> {
        request
            .headers()
            .get(SESSION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|session_id| !session_id.is_empty())
            .and_then(|session_id| self.sessions.resolve(session_id))
    }
}

/// Pipeline-wide admission check, for `middleware::from_fn_with_state`
///
/// Evaluation order:
/// 1. Global disable flag → allow unconditionally, no state touched
/// 2. Valid session → authenticated tier (unless tier-disabled),
///    partitioned by account identity
/// 3. Otherwise → anonymous tier, partitioned by client identity
///
/// Rejections are a uniform empty-body 429 and are warn-logged only on
/// the first rejection of a burst.
pub async fn tiered_limit(
    State(limiter): State<Arc<TieredLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.config.throttling_enabled() {
        return next.run(request).await;
    }

    let period = limiter.period();
    let (decision, scope) = match limiter.account_for(&request) {
        Some(account) => {
            if !limiter.config.authorized_throttling_enabled() {
                return next.run(request).await;
            }
            let policy = GatePolicy::TieredFixed {
                period,
                limit: limiter.config.authorized_requests_per_period(),
            };
            let decision = limiter.gate.check(
                AUTHORIZED_SCOPE,
                &format!("account:{account}"),
                &policy,
                SystemTime::now(),
            );
            (decision, AUTHORIZED_SCOPE)
        }
        None => {
            let policy = GatePolicy::TieredFixed {
                period,
                limit: limiter.config.default_requests_per_period(),
            };
            let identity = identify(&request);
            let decision = limiter.gate.check(
                ANONYMOUS_SCOPE,
                &identity.to_string(),
                &policy,
                SystemTime::now(),
            );
            (decision, ANONYMOUS_SCOPE)
        }
    };

    admit(decision, scope, request, next).await
}

/// Stricter named policy for identity-enumeration-sensitive endpoints
///
/// Attached per-route, on top of the pipeline-wide tiers. Always keyed
/// by client identity, irrespective of authentication state:
/// enumeration abuse is a property of the endpoint, not of caller
/// trust.
pub async fn check_endpoint_limit(
    State(limiter): State<Arc<TieredLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.config.throttling_enabled() {
        return next.run(request).await;
    }

    let policy = GatePolicy::TieredFixed {
        period: limiter.period(),
        limit: limiter.config.check_endpoint_requests_per_period(),
    };
    let identity = identify(&request);
    let decision = limiter.gate.check(
        CHECK_ENDPOINT_SCOPE,
        &identity.to_string(),
        &policy,
        SystemTime::now(),
    );

    admit(decision, CHECK_ENDPOINT_SCOPE, request, next).await
}

/// Turn a gate decision into pipeline flow
///
/// Shared by all middleware in this crate: allowed requests proceed to
/// the inner service, rejected ones short-circuit with an empty 429.
/// The response carries no Retry-After header, matching the original
/// admission contract.
pub(crate) async fn admit(
    decision: Decision,
    scope: &str,
    request: Request,
    next: Next,
) -> Response {
    if decision.allowed {
        return next.run(request).await;
    }

    if decision.first_rejection {
        // One line per burst; the count keeps rising silently after this
        warn!(
            scope,
            count = decision.count,
            limit = decision.limit,
            "rate limit exceeded, rejecting with 429"
        );
    }

    StatusCode::TOO_MANY_REQUESTS.into_response()
}
