//! Caller identity extraction from axum requests
//!
//! Thin adapter between axum's request type and the framework-free
//! [`ClientIdentity::derive`] chain in the core library.

use axum::extract::ConnectInfo;
use axum::http::Request;
use gatecrab::ClientIdentity;
use std::net::SocketAddr;

/// Header carrying an explicit client identifier
///
/// Wins over proxy headers so trusted test harnesses and mobile clients
/// can supply a stable identity.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Standard forwarded-for header appended to by each proxy hop
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Derive the caller's identity for a request
///
/// Reads the client-id header, the forwarded-for header, and the
/// `ConnectInfo<SocketAddr>` extension (present when the app is served
/// with `into_make_service_with_connect_info`). Non-UTF-8 header values
/// are treated as absent and fall through the chain; this never fails.
pub fn identify<B>(request: &Request<B>) -> ClientIdentity {
    let client_id = request
        .headers()
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok());
    let forwarded_for = request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|value| value.to_str().ok());
    let remote_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());

    ClientIdentity::derive(client_id, forwarded_for, remote_addr)
}
