//! Caller identity derivation
//!
//! Every admission check partitions its counters by *who* is calling.
//! [`ClientIdentity`] derives a stable identity string from request
//! metadata using an ordered fallback chain, degrading gracefully to
//! [`ClientIdentity::Unknown`] rather than ever failing.

use std::fmt;
use std::net::IpAddr;

/// A stable, tagged identity for the caller of a request
///
/// Rendered as `client:<id>`, `ip:<address>`, or `unknown`. Derived
/// fresh for every request, never persisted.
///
/// # Example
///
/// ```
/// use gatecrab::ClientIdentity;
///
/// let id = ClientIdentity::derive(None, Some("1.2.3.4, 10.0.0.1"), None);
/// assert_eq!(id.to_string(), "ip:1.2.3.4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClientIdentity {
    /// Explicit client identifier supplied by the caller
    Client(String),
    /// IP address, from a forwarded-for header or the socket peer
    Ip(String),
    /// No usable identity could be derived
    Unknown,
}

impl ClientIdentity {
    /// Derive an identity from request metadata
    ///
    /// The fallback chain, first match wins:
    ///
    /// 1. Non-blank explicit client-id header value → [`Client`](Self::Client)
    /// 2. Non-blank forwarded-for header value → first comma-separated
    ///    token (the original client, not intermediate proxies),
    ///    trimmed → [`Ip`](Self::Ip)
    /// 3. Remote socket address → [`Ip`](Self::Ip)
    /// 4. Otherwise → [`Unknown`](Self::Unknown)
    ///
    /// The explicit header winning over proxy headers lets trusted test
    /// harnesses and mobile clients supply a stable identity that
    /// overrides proxy noise.
    ///
    /// This is a pure function of its inputs and cannot fail.
    pub fn derive(
        client_id: Option<&str>,
        forwarded_for: Option<&str>,
        remote_addr: Option<IpAddr>,
    ) -> Self {
        if let Some(id) = client_id {
            let id = id.trim();
            if !id.is_empty() {
                return ClientIdentity::Client(id.to_string());
            }
        }

        if let Some(forwarded) = forwarded_for {
            // The first token is the originating client; later tokens
            // are appended by each intermediate proxy.
            let first = forwarded.split(',').next().unwrap_or("").trim();
            if !first.is_empty() {
                return ClientIdentity::Ip(first.to_string());
            }
        }

        if let Some(addr) = remote_addr {
            return ClientIdentity::Ip(addr.to_string());
        }

        ClientIdentity::Unknown
    }

    /// Whether the fallback chain terminated without an identity
    pub fn is_unknown(&self) -> bool {
        matches!(self, ClientIdentity::Unknown)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientIdentity::Client(id) => write!(f, "client:{id}"),
            ClientIdentity::Ip(addr) => write!(f, "ip:{addr}"),
            ClientIdentity::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn client_header_wins_over_forwarded_for() {
        let id = ClientIdentity::derive(
            Some("harness-7"),
            Some("1.2.3.4, 10.0.0.1"),
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 0, 1))),
        );
        assert_eq!(id, ClientIdentity::Client("harness-7".to_string()));
        assert_eq!(id.to_string(), "client:harness-7");
    }

    #[test]
    fn forwarded_for_takes_first_token() {
        let id = ClientIdentity::derive(None, Some("1.2.3.4, 10.0.0.1, 10.0.0.2"), None);
        assert_eq!(id.to_string(), "ip:1.2.3.4");
    }

    #[test]
    fn forwarded_for_trims_whitespace() {
        let id = ClientIdentity::derive(None, Some("  5.6.7.8 ,10.0.0.1"), None);
        assert_eq!(id.to_string(), "ip:5.6.7.8");
    }

    #[test]
    fn blank_headers_fall_through() {
        let id = ClientIdentity::derive(
            Some("   "),
            Some(""),
            Some(IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9))),
        );
        assert_eq!(id.to_string(), "ip:9.9.9.9");
    }

    #[test]
    fn no_metadata_yields_unknown() {
        let id = ClientIdentity::derive(None, None, None);
        assert!(id.is_unknown());
        assert_eq!(id.to_string(), "unknown");
    }

    #[test]
    fn forwarded_for_of_only_commas_falls_through() {
        let id = ClientIdentity::derive(None, Some(",,"), None);
        assert!(id.is_unknown());
    }
}
