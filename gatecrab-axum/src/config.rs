//! Typed view over the external throttle configuration
//!
//! The backing store is an application concern (hot-reloadable settings
//! service, environment, static map); this module only defines the
//! [`SettingsProvider`] seam and the read-through [`ThrottleConfig`]
//! accessors with their documented defaults.
//!
//! Values are re-read on every access, never cached, so a hot reload in
//! the provider takes effect on the next request. Absent or malformed
//! values silently resolve to the default; out-of-range values (for
//! example negative limits) are passed through without validation.

use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration keys read by the admission-control layer
pub mod keys {
    /// Master switch for all throttling (`bool`, default `true`)
    pub const ENABLED: &str = "throttle.enabled";
    /// Anonymous-tier quota per period (`i64`, default `100`)
    pub const DEFAULT_REQUESTS_PER_PERIOD: &str = "throttle.defaultRequestsPerPeriod";
    /// Fixed-window length in seconds (`i64`, default `60`)
    pub const PERIOD_IN_SECONDS: &str = "throttle.periodInSeconds";
    /// Switch for the authenticated tier (`bool`, default `true`)
    pub const AUTHORIZED_ENABLED: &str = "throttle.authorized.enabled";
    /// Authenticated-tier quota per period (`i64`, default `1000`)
    pub const AUTHORIZED_REQUESTS_PER_PERIOD: &str = "throttle.authorized.requestsPerPeriod";
    /// Quota for enumeration-sensitive check endpoints (`i64`, default `10`)
    pub const CHECK_ENDPOINT_REQUESTS_PER_PERIOD: &str = "throttle.checkEndpointRequestsPerPeriod";
}

/// Seam to the external configuration provider
///
/// Implementations should be cheap to call: the config view reads
/// through on every request so hot reloads apply immediately.
pub trait SettingsProvider: Send + Sync {
    /// Raw string value for a dotted key, or `None` when unset
    fn get(&self, key: &str) -> Option<String>;
}

/// Read-only typed configuration view
///
/// Cloning is cheap; all clones share the same provider.
#[derive(Clone)]
pub struct ThrottleConfig {
    provider: Arc<dyn SettingsProvider>,
}

impl ThrottleConfig {
    /// Create a view over the given provider
    pub fn new(provider: Arc<dyn SettingsProvider>) -> Self {
        ThrottleConfig { provider }
    }

    fn read<T: FromStr>(&self, key: &str, default: T) -> T {
        self.provider
            .get(key)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Whether any throttling happens at all; doubles as the
    /// anonymous-tier switch. Default `true`.
    pub fn throttling_enabled(&self) -> bool {
        self.read(keys::ENABLED, true)
    }

    /// Anonymous-tier requests per period. Default `100`.
    pub fn default_requests_per_period(&self) -> i64 {
        self.read(keys::DEFAULT_REQUESTS_PER_PERIOD, 100)
    }

    /// Fixed-window length in seconds for all tiered policies.
    /// Default `60`.
    pub fn period_in_seconds(&self) -> i64 {
        self.read(keys::PERIOD_IN_SECONDS, 60)
    }

    /// Whether the authenticated tier is throttled. Default `true`.
    pub fn authorized_throttling_enabled(&self) -> bool {
        self.read(keys::AUTHORIZED_ENABLED, true)
    }

    /// Authenticated-tier requests per period. Default `1000`.
    pub fn authorized_requests_per_period(&self) -> i64 {
        self.read(keys::AUTHORIZED_REQUESTS_PER_PERIOD, 1000)
    }

    /// Quota for the stricter check-endpoint policy. Default `10`.
    pub fn check_endpoint_requests_per_period(&self) -> i64 {
        self.read(keys::CHECK_ENDPOINT_REQUESTS_PER_PERIOD, 10)
    }
}

/// Map-backed settings, for tests and fixed deployments
///
/// Deserializes transparently from a string-to-string map, so it can be
/// loaded from any serde-supported format.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticSettings {
    values: HashMap<String, String>,
}

impl StaticSettings {
    /// Create an empty settings map (every read hits its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one key/value pair, builder-style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl SettingsProvider for StaticSettings {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Process-environment settings
///
/// Maps dotted keys to prefixed environment variables:
/// `throttle.authorized.enabled` with the default prefix becomes
/// `GATECRAB_THROTTLE_AUTHORIZED_ENABLED`.
#[derive(Debug, Clone)]
pub struct EnvSettings {
    prefix: String,
}

impl EnvSettings {
    /// Settings with the default `GATECRAB_` prefix
    pub fn new() -> Self {
        Self::with_prefix("GATECRAB_")
    }

    /// Settings with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        EnvSettings {
            prefix: prefix.into(),
        }
    }

    fn var_name(&self, key: &str) -> String {
        let mangled: String = key
            .chars()
            .map(|c| if c == '.' { '_' } else { c.to_ascii_uppercase() })
            .collect();
        format!("{}{mangled}", self.prefix)
    }
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsProvider for EnvSettings {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(self.var_name(key)).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(settings: StaticSettings) -> ThrottleConfig {
        ThrottleConfig::new(Arc::new(settings))
    }

    #[test]
    fn test_defaults_when_provider_is_empty() {
        let config = config(StaticSettings::new());
        assert!(config.throttling_enabled());
        assert_eq!(config.default_requests_per_period(), 100);
        assert_eq!(config.period_in_seconds(), 60);
        assert!(config.authorized_throttling_enabled());
        assert_eq!(config.authorized_requests_per_period(), 1000);
        assert_eq!(config.check_endpoint_requests_per_period(), 10);
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let config = config(
            StaticSettings::new()
                .with(keys::ENABLED, "false")
                .with(keys::DEFAULT_REQUESTS_PER_PERIOD, "5")
                .with(keys::PERIOD_IN_SECONDS, "30")
                .with(keys::AUTHORIZED_ENABLED, "false")
                .with(keys::AUTHORIZED_REQUESTS_PER_PERIOD, "50")
                .with(keys::CHECK_ENDPOINT_REQUESTS_PER_PERIOD, "2"),
        );
        assert!(!config.throttling_enabled());
        assert_eq!(config.default_requests_per_period(), 5);
        assert_eq!(config.period_in_seconds(), 30);
        assert!(!config.authorized_throttling_enabled());
        assert_eq!(config.authorized_requests_per_period(), 50);
        assert_eq!(config.check_endpoint_requests_per_period(), 2);
    }

    #[test]
    fn test_malformed_values_resolve_to_defaults() {
        let config = config(
            StaticSettings::new()
                .with(keys::ENABLED, "yes please")
                .with(keys::DEFAULT_REQUESTS_PER_PERIOD, "lots"),
        );
        assert!(config.throttling_enabled());
        assert_eq!(config.default_requests_per_period(), 100);
    }

    #[test]
    fn test_out_of_range_values_pass_through_unvalidated() {
        let config = config(StaticSettings::new().with(keys::DEFAULT_REQUESTS_PER_PERIOD, "-1"));
        assert_eq!(config.default_requests_per_period(), -1);
    }

    #[test]
    fn test_values_are_hot_read() {
        // Two views over the same provider value observe whatever the
        // provider returns at call time; nothing is cached in the view.
        struct Flipping(std::sync::atomic::AtomicBool);
        impl SettingsProvider for Flipping {
            fn get(&self, key: &str) -> Option<String> {
                if key != keys::ENABLED {
                    return None;
                }
                let prev = self.0.fetch_xor(true, std::sync::atomic::Ordering::SeqCst);
                Some(prev.to_string())
            }
        }

        let config = ThrottleConfig::new(Arc::new(Flipping(Default::default())));
        assert!(!config.throttling_enabled());
        assert!(config.throttling_enabled());
    }

    #[test]
    fn test_env_settings_key_mangling() {
        let settings = EnvSettings::with_prefix("LESSONAPP_");
        assert_eq!(
            settings.var_name("throttle.authorized.enabled"),
            "LESSONAPP_THROTTLE_AUTHORIZED_ENABLED"
        );
    }

    #[test]
    fn test_static_settings_deserialize() {
        let settings: StaticSettings =
            serde_json::from_str(r#"{"throttle.enabled": "false"}"#).unwrap();
        let config = config(settings);
        assert!(!config.throttling_enabled());
    }
}
