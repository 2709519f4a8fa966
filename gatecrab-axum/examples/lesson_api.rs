//! Miniature lesson-plan API wired with the full admission pipeline
//!
//! Run with:
//!
//! ```bash
//! cargo run --example lesson_api
//! ```
//!
//! Then poke at it:
//!
//! ```bash
//! # Anonymous tier (5 per 10 seconds here)
//! for i in $(seq 1 7); do curl -s -o /dev/null -w "%{http_code}\n" localhost:3000/lessons; done
//!
//! # Per-action cap on activation (3 per 5 seconds per client)
//! for i in $(seq 1 5); do curl -s -o /dev/null -w "%{http_code}\n" -X POST localhost:3000/accounts/activate; done
//!
//! # Authenticated callers ride the larger authorized quota
//! curl -s -H 'x-session-id: demo-session' localhost:3000/lessons
//! ```

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::{Json, Router};
use gatecrab::AdmissionGate;
use gatecrab_axum::session::SessionResolver;
use gatecrab_axum::{action, config::keys, tiered};
use gatecrab_axum::{ActionThrottle, StaticSettings, ThrottleConfig, TieredLimiter};
use std::net::SocketAddr;
use std::sync::Arc;

/// Stand-in for the real session subsystem: one hardcoded session
struct DemoSessions;

impl SessionResolver for DemoSessions {
    fn resolve(&self, session_id: &str) -> Option<String> {
        (session_id == "demo-session").then(|| "account-42".to_string())
    }
}

async fn list_lessons() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "lessons": [
            { "id": 1, "title": "Fractions, part one" },
            { "id": 2, "title": "The water cycle" },
        ]
    }))
}

async fn activate_account() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "activated": true }))
}

async fn check_email() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "registered": false }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gatecrab_axum=debug".parse()?),
        )
        .init();

    // Small quotas so the demo trips visibly
    let settings = StaticSettings::new()
        .with(keys::DEFAULT_REQUESTS_PER_PERIOD, "5")
        .with(keys::PERIOD_IN_SECONDS, "10")
        .with(keys::AUTHORIZED_REQUESTS_PER_PERIOD, "50")
        .with(keys::CHECK_ENDPOINT_REQUESTS_PER_PERIOD, "2");

    let gate = Arc::new(AdmissionGate::new());
    let config = ThrottleConfig::new(Arc::new(settings));
    let limiter = Arc::new(TieredLimiter::new(
        Arc::clone(&gate),
        config.clone(),
        Arc::new(DemoSessions),
    ));
    let activation = Arc::new(
        ActionThrottle::new(Arc::clone(&gate), config, "accounts", "activate")
            .window_ms(5_000)
            .limit(3)
            .per_client(true),
    );

    let app = Router::new()
        .route("/lessons", get(list_lessons))
        .route(
            "/accounts/activate",
            post(activate_account).layer(from_fn_with_state(activation, action::enforce)),
        )
        .route(
            "/accounts/check-email",
            post(check_email).layer(from_fn_with_state(
                Arc::clone(&limiter),
                tiered::check_endpoint_limit,
            )),
        )
        .layer(from_fn_with_state(limiter, tiered::tiered_limit));

    let addr: SocketAddr = "127.0.0.1:3000".parse()?;
    tracing::info!("lesson API listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        // Connect info feeds the ip: fallback of the identity chain
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
