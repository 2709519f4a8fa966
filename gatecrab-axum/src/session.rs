//! Seam to the authentication/session subsystem
//!
//! The admission layer never validates credentials itself; it only asks
//! the session collaborator "is this caller authenticated, and under
//! what identity". An absent or invalid session id simply means the
//! request is throttled on the anonymous tier.

/// Header carrying the caller's session id
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Resolves a session id to an account identity
///
/// Resolution must be synchronous and in-memory cheap: it runs inside
/// every admission check, ahead of all business logic. Implementations
/// backed by slow stores should resolve against their own local cache.
pub trait SessionResolver: Send + Sync {
    /// The account identity for a valid session, or `None` for an
    /// unknown/expired session
    fn resolve(&self, session_id: &str) -> Option<String>;
}

/// Resolver for deployments without authenticated callers
///
/// Every request lands on the anonymous tier.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSessions;

impl SessionResolver for NoSessions {
    fn resolve(&self, _session_id: &str) -> Option<String> {
        None
    }
}
