//! Pool configuration.

use std::fmt;
use std::time::Duration;

use crate::error::PoolError;

/// Alias of the one pool a process owns.
pub const DEFAULT_POOL_ALIAS: &str = "default";

/// Environment variable holding the connection string.
pub const ENV_DB_URI: &str = "DB_URI";
/// Environment variable holding the database user.
pub const ENV_DB_USER: &str = "DB_USER";
/// Environment variable holding the database password.
pub const ENV_DB_PWD: &str = "DB_PWD";

/// Credentials and teardown settings for the process pool.
///
/// Built once (usually from the environment) and never changed afterwards.
/// Missing values are kept as `None` and only reported when the pool is
/// actually created.
#[derive(Clone)]
pub struct PoolConfig {
    /// Database user.
    pub user: Option<String>,
    /// Database password.
    pub password: Option<String>,
    /// Driver connection string (host, port, service, URL...).
    pub connect_string: Option<String>,
    /// How long pool close waits for in-flight work. Zero means no grace
    /// period.
    pub drain_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            user: None,
            password: None,
            connect_string: None,
            drain_timeout: Duration::ZERO,
        }
    }
}

impl PoolConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `DB_URI`, `DB_USER` and `DB_PWD` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            user: read(ENV_DB_USER),
            password: read(ENV_DB_PWD),
            connect_string: read(ENV_DB_URI),
            drain_timeout: Duration::ZERO,
        }
    }

    /// Set the user.
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the connection string.
    #[must_use]
    pub fn connect_string(mut self, connect_string: impl Into<String>) -> Self {
        self.connect_string = Some(connect_string.into());
        self
    }

    /// Set the drain timeout used when the pool is closed.
    #[must_use]
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// The alias the pool is registered under. Always [`DEFAULT_POOL_ALIAS`].
    #[must_use]
    pub fn pool_alias(&self) -> &'static str {
        DEFAULT_POOL_ALIAS
    }

    /// Check that every credential is present.
    pub fn validate(&self) -> Result<(), PoolError> {
        let missing: Vec<&'static str> = [
            (ENV_DB_URI, self.connect_string.is_none()),
            (ENV_DB_USER, self.user.is_none()),
            (ENV_DB_PWD, self.password.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PoolError::Configuration { missing })
        }
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("connect_string", &self.connect_string)
            .field("pool_alias", &self.pool_alias())
            .field("drain_timeout", &self.drain_timeout)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_credentials() {
        let config = PoolConfig::from_lookup(lookup(&[
            ("DB_URI", "localhost/XEPDB1"),
            ("DB_USER", "app"),
            ("DB_PWD", "secret"),
        ]));

        assert_eq!(config.connect_string.as_deref(), Some("localhost/XEPDB1"));
        assert_eq!(config.user.as_deref(), Some("app"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.drain_timeout, Duration::ZERO);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_uri_fails_validation() {
        let config = PoolConfig::from_lookup(lookup(&[("DB_USER", "app"), ("DB_PWD", "secret")]));

        match config.validate() {
            Err(PoolError::Configuration { missing }) => assert_eq!(missing, vec!["DB_URI"]),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_is_unset() {
        let config = PoolConfig::from_lookup(lookup(&[("DB_URI", "  ")]));
        assert!(config.connect_string.is_none());
    }

    #[test]
    fn test_alias_is_fixed() {
        assert_eq!(PoolConfig::new().pool_alias(), "default");
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = PoolConfig::new().password("hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }
}
