//! Administrative reset endpoints (test builds only)
//!
//! Test automation needs a way to reset throttle state between cases
//! without restarting the process or waiting out windows. This router
//! is compiled only under the non-default `test-endpoints` feature and
//! must never ship in a production build.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use gatecrab::AdmissionGate;
use std::sync::Arc;
use tracing::info;

/// Router exposing the reset endpoints
///
/// - `POST /__throttle/reset`: bump the reset generation (O(1); old
///   counters become unreachable and age out)
/// - `POST /__throttle/clear`: discard every stored counter
///
/// Merge into the application router *behind* whatever test-only
/// routing guard the host app uses.
pub fn router(gate: Arc<AdmissionGate>) -> Router {
    Router::new()
        .route("/__throttle/reset", post(reset_generation))
        .route("/__throttle/clear", post(clear_counters))
        .with_state(gate)
}

async fn reset_generation(State(gate): State<Arc<AdmissionGate>>) -> StatusCode {
    let generation = gate.reset();
    info!(generation, "throttle generation reset");
    StatusCode::NO_CONTENT
}

async fn clear_counters(State(gate): State<Arc<AdmissionGate>>) -> StatusCode {
    gate.clear();
    info!("throttle counters cleared");
    StatusCode::NO_CONTENT
}
