//! Driver options and connect-string parsing.

use std::time::Duration;

use pooldb_pool::{DriverError, PoolConfig};
use sqlx::postgres::PgConnectOptions;

/// Default maximum connections per pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Options for pools created by [`PgDriver`](crate::PgDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PgDriverConfig {
    /// Maximum connections per pool.
    pub max_connections: u32,
    /// Time to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PgDriverConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

impl PgDriverConfig {
    /// Set the maximum connections per pool.
    #[must_use]
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the acquire timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Build sqlx connect options from pool credentials.
///
/// The connect string is either a URL (`postgres://host:5432/app`) or the
/// short form `host[:port][/database]`. `user` and `password` override any
/// credentials in the URL.
pub fn connect_options(config: &PoolConfig) -> Result<PgConnectOptions, DriverError> {
    let connect_string = config
        .connect_string
        .as_deref()
        .ok_or_else(|| DriverError::new("connect string is not set"))?;

    let mut options = parse_connect_string(connect_string)?;
    if let Some(user) = &config.user {
        options = options.username(user);
    }
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

fn parse_connect_string(s: &str) -> Result<PgConnectOptions, DriverError> {
    let s = s.trim();
    if s.contains("://") {
        return s
            .parse::<PgConnectOptions>()
            .map_err(|e| DriverError::with_source("invalid postgres connection URL", e));
    }

    let (address, database) = match s.split_once('/') {
        Some((address, database)) => (address, Some(database)),
        None => (s, None),
    };
    let (host, port) = match address.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|e| DriverError::with_source(format!("invalid port '{port}'"), e))?;
            (host, Some(port))
        }
        None => (address, None),
    };
    if host.is_empty() {
        return Err(DriverError::new(format!("connect string '{s}' has no host")));
    }

    let mut options = PgConnectOptions::new().host(host);
    if let Some(port) = port {
        options = options.port(port);
    }
    if let Some(database) = database.filter(|d| !d.is_empty()) {
        options = options.database(database);
    }
    Ok(options)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn credentials(uri: &str) -> PoolConfig {
        PoolConfig::new()
            .connect_string(uri)
            .user("app")
            .password("secret")
    }

    #[test]
    fn test_short_form() {
        let options = connect_options(&credentials("db.internal:6432/billing")).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6432);
        assert_eq!(options.get_database(), Some("billing"));
        assert_eq!(options.get_username(), "app");
    }

    #[test]
    fn test_host_only() {
        let options = connect_options(&credentials("localhost")).unwrap();
        assert_eq!(options.get_host(), "localhost");
    }

    #[test]
    fn test_url_with_credentials_overridden() {
        let options =
            connect_options(&credentials("postgres://other@pg.example:5433/app")).unwrap();
        assert_eq!(options.get_host(), "pg.example");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_username(), "app");
    }

    #[test]
    fn test_bad_port() {
        assert!(connect_options(&credentials("localhost:pg/app")).is_err());
    }

    #[test]
    fn test_missing_connect_string() {
        assert!(connect_options(&PoolConfig::new()).is_err());
    }

    #[test]
    fn test_missing_host() {
        assert!(connect_options(&credentials(":5432/app")).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = PgDriverConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout, Duration::from_secs(30));
    }
}
