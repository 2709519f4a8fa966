//! Declarative per-endpoint throttling
//!
//! Endpoints that need a bespoke cap (account activation, password
//! reset, anything expensive or abusable) declare an
//! [`ActionThrottle`] with their own window and limit and attach it to
//! the route via [`enforce`]. The gate uses sliding-expiry windows:
//! every hit pushes the window forward, so a hammering caller stays
//! locked out until they go quiet for a full window.

use crate::config::ThrottleConfig;
use crate::identity::identify;
use crate::tiered::admit;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use gatecrab::{AdmissionGate, Decision, GatePolicy};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Subject used when a throttle is not partitioned by caller
const SHARED_SUBJECT: &str = "shared";

/// A per-endpoint admission gate with a caller-specified policy
///
/// Immutable once attached to a route. Multiple endpoints may declare
/// identical shapes; their state stays independent because the scope
/// (`{controller}.{action}`) is part of every partition key.
///
/// Defaults: 60 requests per 60-second window, partitioned by client.
///
/// # Example
///
/// ```
/// use gatecrab::AdmissionGate;
/// use gatecrab_axum::{ActionThrottle, StaticSettings, ThrottleConfig};
/// use std::sync::Arc;
///
/// let gate = Arc::new(AdmissionGate::new());
/// let config = ThrottleConfig::new(Arc::new(StaticSettings::new()));
///
/// let throttle = ActionThrottle::new(gate, config, "accounts", "activate")
///     .window_ms(5_000)
///     .limit(3)
///     .per_client(true);
/// ```
#[derive(Clone)]
pub struct ActionThrottle {
    gate: Arc<AdmissionGate>,
    config: ThrottleConfig,
    scope: String,
    window: Duration,
    limit: i64,
    per_client: bool,
}

impl ActionThrottle {
    /// Declare a throttle for `{controller}.{action}`
    pub fn new(
        gate: Arc<AdmissionGate>,
        config: ThrottleConfig,
        controller: &str,
        action: &str,
    ) -> Self {
        ActionThrottle {
            gate,
            config,
            scope: format!("{controller}.{action}"),
            window: Duration::from_secs(60),
            limit: 60,
            per_client: true,
        }
    }

    /// Set the sliding window length in milliseconds
    pub fn window_ms(mut self, window_ms: u64) -> Self {
        self.window = Duration::from_millis(window_ms);
        self
    }

    /// Set the accepted-request cap per window
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Partition by caller identity (`true`, the default) or share one
    /// counter across all callers
    ///
    /// A shared counter is a global cap protecting an expensive shared
    /// resource rather than a per-caller fairness mechanism.
    pub fn per_client(mut self, per_client: bool) -> Self {
        self.per_client = per_client;
        self
    }

    /// The `{controller}.{action}` scope of this throttle
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn evaluate<B>(&self, request: &axum::http::Request<B>, now: SystemTime) -> Decision {
        let policy = GatePolicy::PerActionSliding {
            window: self.window,
            limit: self.limit,
            per_client: self.per_client,
        };
        let subject = if self.per_client {
            identify(request).to_string()
        } else {
            SHARED_SUBJECT.to_string()
        };
        self.gate.check(&self.scope, &subject, &policy, now)
    }
}

/// Route-level admission check, for `middleware::from_fn_with_state`
///
/// Runs after the pipeline-wide tiered limiter (layer ordering is the
/// application's concern; the declared counter is independent either
/// way). The hit is recorded even when rejecting, so repeated hits past
/// the limit keep counting rather than freezing; rejection is the
/// uniform empty-body 429, warn-logged once per burst.
pub async fn enforce(
    State(throttle): State<Arc<ActionThrottle>>,
    request: Request,
    next: Next,
) -> Response {
    // Global kill switch: allow without touching any state
    if !throttle.config.throttling_enabled() {
        return next.run(request).await;
    }

    let decision = throttle.evaluate(&request, SystemTime::now());
    admit(decision, &throttle.scope, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;
    use crate::StaticSettings;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    fn throttle(limit: i64) -> ActionThrottle {
        let gate = Arc::new(AdmissionGate::new());
        let config = ThrottleConfig::new(Arc::new(StaticSettings::new()));
        ActionThrottle::new(gate, config, "accounts", "activate")
            .window_ms(5_000)
            .limit(limit)
    }

    fn request(client: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .uri("/accounts/activate")
            .header(crate::identity::CLIENT_ID_HEADER, client)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_scope_joins_controller_and_action() {
        assert_eq!(throttle(3).scope(), "accounts.activate");
    }

    #[test]
    fn test_evaluate_partitions_by_client() {
        let throttle = throttle(1);
        let now = SystemTime::now();

        assert!(throttle.evaluate(&request("a"), now).allowed);
        assert!(throttle.evaluate(&request("b"), now).allowed);
        assert!(!throttle.evaluate(&request("a"), now).allowed);
    }

    #[test]
    fn test_evaluate_shared_counter_spans_clients() {
        let throttle = throttle(2).per_client(false);
        let now = SystemTime::now();

        assert!(throttle.evaluate(&request("a"), now).allowed);
        assert!(throttle.evaluate(&request("b"), now).allowed);
        assert!(!throttle.evaluate(&request("c"), now).allowed);
    }

    #[test]
    fn test_rejections_keep_counting() {
        let throttle = throttle(2);
        let now = SystemTime::now();

        throttle.evaluate(&request("a"), now);
        throttle.evaluate(&request("a"), now);
        let first = throttle.evaluate(&request("a"), now);
        let second = throttle.evaluate(&request("a"), now);

        assert!(first.first_rejection);
        assert_eq!(first.count, 3);
        assert!(!second.first_rejection);
        assert_eq!(second.count, 4);
    }

    #[test]
    fn test_idle_period_resets_the_window() {
        let throttle = throttle(1);
        let now = SystemTime::now();

        assert!(throttle.evaluate(&request("a"), now).allowed);
        assert!(!throttle.evaluate(&request("a"), now).allowed);

        let later = now + Duration::from_millis(5_100);
        assert!(throttle.evaluate(&request("a"), later).allowed);
    }

    #[test]
    fn test_disabled_config_is_observable() {
        let gate = Arc::new(AdmissionGate::new());
        let settings = StaticSettings::new().with(keys::ENABLED, "false");
        let config = ThrottleConfig::new(Arc::new(settings));
        let throttle = ActionThrottle::new(gate, config.clone(), "accounts", "activate");

        assert!(!throttle.config.throttling_enabled());
    }
}
