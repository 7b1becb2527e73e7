use std::env::{self, VarError};
use std::time::Duration;

use serde::Deserialize;

use crate::error::DbConnectionError;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600;

/// Basic configuration for creating a SQLx connection pool.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConnectionConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: Option<u64>,
}

impl Default for DbConnectionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            idle_timeout_secs: Some(DEFAULT_IDLE_TIMEOUT_SECS),
        }
    }
}

impl DbConnectionConfig {
    /// Creates a new configuration with the provided URL and sane defaults.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Loads configuration from environment variables using the supplied prefix.
    ///
    /// Expected variables:
    /// - `{PREFIX}_DATABASE_URL` (required)
    /// - `{PREFIX}_DB_MAX_CONNECTIONS` (optional)
    /// - `{PREFIX}_DB_MIN_CONNECTIONS` (optional)
    /// - `{PREFIX}_DB_CONNECT_TIMEOUT_SECS` (optional)
    /// - `{PREFIX}_DB_IDLE_TIMEOUT_SECS` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, DbConnectionError> {
        let url_var = format!("{}_DATABASE_URL", prefix);
        let url =
            env::var(&url_var).map_err(|_| DbConnectionError::MissingEnvVar(url_var.clone()))?;
        if url.trim().is_empty() {
            return Err(DbConnectionError::EmptyDatabaseUrl);
        }

        let mut config = Self::new(url);

        if let Some(max) = maybe_parse(prefix, "DB_MAX_CONNECTIONS")? {
            config.max_connections = max;
        }
        if let Some(min) = maybe_parse(prefix, "DB_MIN_CONNECTIONS")? {
            config.min_connections = min;
        }
        if config.max_connections == 0 {
            return Err(DbConnectionError::InvalidValue {
                var: format!("{prefix}_DB_MAX_CONNECTIONS"),
                reason: "max_connections must be greater than 0".to_owned(),
            });
        }
        if config.min_connections > config.max_connections {
            return Err(DbConnectionError::InvalidValue {
                var: format!("{prefix}_DB_MIN_CONNECTIONS"),
                reason: "min_connections must not exceed max_connections".to_owned(),
            });
        }
        if let Some(connect_timeout) = maybe_parse(prefix, "DB_CONNECT_TIMEOUT_SECS")? {
            config.connect_timeout_secs = connect_timeout;
        }
        if let Some(idle_timeout) = maybe_parse(prefix, "DB_IDLE_TIMEOUT_SECS")? {
            config.idle_timeout_secs = Some(idle_timeout);
        }

        Ok(config)
    }

    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

fn maybe_parse<T: std::str::FromStr>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>, DbConnectionError>
where
    T::Err: std::fmt::Display,
{
    let var_name = format!("{prefix}_{suffix}");
    match env::var(&var_name) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<T>()
                .map(Some)
                .map_err(|e| DbConnectionError::InvalidValue {
                    var: var_name,
                    reason: e.to_string(),
                })
        }
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(_)) => Err(DbConnectionError::InvalidUnicode(var_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_requires_url() {
        std::env::remove_var("DBCFGTESTA_DATABASE_URL");
        let err = DbConnectionConfig::from_env("DBCFGTESTA").unwrap_err();
        assert!(matches!(err, DbConnectionError::MissingEnvVar(_)));
    }

    #[test]
    fn from_env_reads_overrides() {
        std::env::set_var("DBCFGTESTB_DATABASE_URL", "sqlite::memory:");
        std::env::set_var("DBCFGTESTB_DB_MAX_CONNECTIONS", "5");
        std::env::set_var("DBCFGTESTB_DB_MIN_CONNECTIONS", "2");

        let cfg = DbConnectionConfig::from_env("DBCFGTESTB").expect("config");
        assert_eq!(cfg.url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 5);
        assert_eq!(cfg.min_connections, 2);

        std::env::remove_var("DBCFGTESTB_DATABASE_URL");
        std::env::remove_var("DBCFGTESTB_DB_MAX_CONNECTIONS");
        std::env::remove_var("DBCFGTESTB_DB_MIN_CONNECTIONS");
    }

    #[test]
    fn from_env_rejects_min_above_max() {
        std::env::set_var("DBCFGTESTC_DATABASE_URL", "sqlite::memory:");
        std::env::set_var("DBCFGTESTC_DB_MAX_CONNECTIONS", "2");
        std::env::set_var("DBCFGTESTC_DB_MIN_CONNECTIONS", "4");

        let err = DbConnectionConfig::from_env("DBCFGTESTC").unwrap_err();
        assert!(matches!(err, DbConnectionError::InvalidValue { .. }));

        std::env::remove_var("DBCFGTESTC_DATABASE_URL");
        std::env::remove_var("DBCFGTESTC_DB_MAX_CONNECTIONS");
        std::env::remove_var("DBCFGTESTC_DB_MIN_CONNECTIONS");
    }
}
