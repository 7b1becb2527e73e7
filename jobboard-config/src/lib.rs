use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub database: Option<DatabaseSection>,
    #[serde(default)]
    pub auth: Option<AuthSection>,
    #[serde(default)]
    pub mailer: Option<MailerSection>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSection {
    pub driver: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default)]
    pub session_ttl_hours: Option<i64>,
    #[serde(default)]
    pub reset_token_ttl_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct MailerSection {
    #[serde(default)]
    pub tool_path: Option<String>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub reset_link_base: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try each enabled format in turn when the extension gives no hint.
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s;
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub mailer: MailerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatabaseConfig {
    pub driver: String,
    pub path: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub session_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MailerConfig {
    pub tool_path: Option<String>,
    pub from_address: Option<String>,
    pub reset_link_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            database: DatabaseConfig {
                driver: "sqlite".to_string(),
                path: Some("jobboard.sqlite".to_string()),
                host: None,
                port: None,
                database: None,
                username: None,
                password: None,
            },
            auth: AuthConfig {
                jwt_secret: None,
                session_ttl_hours: 24 * 7,
                reset_token_ttl_minutes: 60,
            },
            mailer: MailerConfig {
                tool_path: None,
                from_address: None,
                reset_link_base: "http://localhost:4000/reset-password".to_string(),
            },
        }
    }
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
    ($target:expr, $source:expr, wrap) => {
        if let Some(v) = $source {
            $target = Some(v);
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        let raw = load_raw_from_file(p)?;
        if let Some(server) = raw.server {
            apply_opt!(cfg.server.host, server.host);
            apply_opt!(cfg.server.port, server.port);
        }
        if let Some(logging) = raw.logging {
            apply_opt!(cfg.logging.level, logging.level);
            apply_opt!(cfg.logging.json, logging.json);
        }
        if let Some(db) = raw.database {
            cfg.database.driver = db.driver;
            apply_opt!(cfg.database.path, db.path, wrap);
            apply_opt!(cfg.database.host, db.host, wrap);
            apply_opt!(cfg.database.port, db.port, wrap);
            apply_opt!(cfg.database.database, db.database, wrap);
            apply_opt!(cfg.database.username, db.username, wrap);
            apply_opt!(cfg.database.password, db.password, wrap);
        }
        if let Some(auth) = raw.auth {
            apply_opt!(cfg.auth.jwt_secret, auth.jwt_secret, wrap);
            apply_opt!(cfg.auth.session_ttl_hours, auth.session_ttl_hours);
            apply_opt!(
                cfg.auth.reset_token_ttl_minutes,
                auth.reset_token_ttl_minutes
            );
        }
        if let Some(mailer) = raw.mailer {
            apply_opt!(cfg.mailer.tool_path, mailer.tool_path, wrap);
            apply_opt!(cfg.mailer.from_address, mailer.from_address, wrap);
            apply_opt!(cfg.mailer.reset_link_base, mailer.reset_link_base);
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

/// Helper to parse env var as a specific type
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" => Ok(Some(true)),
            "0" | "false" | "no" | "n" => Ok(Some(false)),
            _ => Err(ConfigError::Parse(format!("invalid {}", key))),
        },
        Err(_) => Ok(None),
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

/// Apply all environment variable overrides to config
fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Server
    if let Some(v) = env_str("JOBBOARD_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = env_parse::<u16>("JOBBOARD_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("JOBBOARD_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("JOBBOARD_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // Database
    if let Some(v) = env_str("JOBBOARD_DATABASE_DRIVER") {
        cfg.database.driver = v;
    }
    if let Some(v) = env_str("JOBBOARD_DATABASE_PATH") {
        cfg.database.path = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_DATABASE_HOST") {
        cfg.database.host = Some(v);
    }
    if let Some(v) = env_parse::<u16>("JOBBOARD_DATABASE_PORT")? {
        cfg.database.port = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_DATABASE_NAME") {
        cfg.database.database = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_DATABASE_USERNAME") {
        cfg.database.username = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_DATABASE_PASSWORD") {
        cfg.database.password = Some(v);
    }

    // Auth
    if let Some(v) = env_str("JOBBOARD_JWT_SECRET") {
        cfg.auth.jwt_secret = Some(v);
    }
    if let Some(v) = env_parse::<i64>("JOBBOARD_SESSION_TTL_HOURS")? {
        cfg.auth.session_ttl_hours = v;
    }
    if let Some(v) = env_parse::<i64>("JOBBOARD_RESET_TOKEN_TTL_MINUTES")? {
        cfg.auth.reset_token_ttl_minutes = v;
    }

    // Mailer
    if let Some(v) = env_str("JOBBOARD_MAILER_TOOL_PATH") {
        cfg.mailer.tool_path = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_MAILER_FROM") {
        cfg.mailer.from_address = Some(v);
    }
    if let Some(v) = env_str("JOBBOARD_RESET_LINK_BASE") {
        cfg.mailer.reset_link_base = v;
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    // Allow IPs or a simple hostname pattern
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }

    match cfg.database.driver.as_str() {
        "sqlite" | "postgres" | "mysql" => {}
        other => {
            return Err(ConfigError::Validation(format!(
                "unsupported database driver: {}",
                other
            )))
        }
    }
    if cfg.database.driver != "sqlite" {
        if cfg
            .database
            .host
            .as_deref()
            .map(|s| s.is_empty())
            .unwrap_or(true)
        {
            return Err(ConfigError::Validation(
                "database.host must be set for non-sqlite drivers".to_string(),
            ));
        }
        if cfg
            .database
            .database
            .as_deref()
            .map(|s| s.is_empty())
            .unwrap_or(true)
        {
            return Err(ConfigError::Validation(
                "database.database must be set for non-sqlite drivers".to_string(),
            ));
        }
    }

    if cfg.auth.session_ttl_hours <= 0 {
        return Err(ConfigError::Validation(
            "auth.session_ttl_hours must be positive".to_string(),
        ));
    }
    if cfg.auth.reset_token_ttl_minutes <= 0 {
        return Err(ConfigError::Validation(
            "auth.reset_token_ttl_minutes must be positive".to_string(),
        ));
    }

    // The reset link lands in outbound email, so it must be an absolute http(s) URL.
    match url::Url::parse(&cfg.mailer.reset_link_base) {
        Ok(u) => {
            let scheme = u.scheme();
            if scheme != "http" && scheme != "https" {
                return Err(ConfigError::Validation(format!(
                    "mailer.reset_link_base must be http or https: {}",
                    cfg.mailer.reset_link_base
                )));
            }
        }
        Err(_) => {
            return Err(ConfigError::Validation(format!(
                "invalid mailer.reset_link_base: {}",
                cfg.mailer.reset_link_base
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_toml() {
        let f = NamedTempFile::new().expect("tmpfile");
        std::fs::write(
            f.path(),
            r#"
[server]
host = "127.0.0.1"
port = 4000

[database]
driver = "sqlite"
path = "board.sqlite"

[auth]
jwt_secret = "dev-secret"
"#,
        )
        .unwrap();
        let cfg = load_raw_from_file(f.path()).expect("load");
        assert!(cfg.server.is_some());
        assert!(cfg.database.is_some());
        let s = cfg.server.unwrap();
        assert_eq!(s.host.unwrap(), "127.0.0.1");
        assert_eq!(s.port.unwrap(), 4000);
        assert_eq!(cfg.auth.unwrap().jwt_secret.unwrap(), "dev-secret");
    }

    #[test]
    fn parse_yaml() {
        let f = NamedTempFile::new().expect("tmpfile");
        std::fs::write(
            f.path(),
            r#"
server:
  host: 0.0.0.0
  port: 9000
database:
  driver: postgres
  host: db
  port: 5432
mailer:
  tool_path: /usr/local/bin/jobboard-sendmail
"#,
        )
        .unwrap();
        let cfg = load_raw_from_file(f.path()).expect("load");
        let s = cfg.server.unwrap();
        assert_eq!(s.host.unwrap(), "0.0.0.0");
        assert_eq!(s.port.unwrap(), 9000);
        assert_eq!(
            cfg.mailer.unwrap().tool_path.unwrap(),
            "/usr/local/bin/jobboard-sendmail"
        );
    }

    #[test]
    fn env_overrides() {
        for k in &[
            "JOBBOARD_SERVER_HOST",
            "JOBBOARD_SERVER_PORT",
            "JOBBOARD_LOG_LEVEL",
            "JOBBOARD_JWT_SECRET",
        ] {
            std::env::remove_var(k);
        }

        std::env::set_var("JOBBOARD_SERVER_HOST", "10.1.2.3");
        std::env::set_var("JOBBOARD_SERVER_PORT", "1234");
        std::env::set_var("JOBBOARD_LOG_LEVEL", "debug");
        std::env::set_var("JOBBOARD_JWT_SECRET", "from-env");

        let cfg = load_config::<&Path>(None).expect("load config");
        assert_eq!(cfg.server.host, "10.1.2.3");
        assert_eq!(cfg.server.port, 1234);
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("from-env"));

        for k in &[
            "JOBBOARD_SERVER_HOST",
            "JOBBOARD_SERVER_PORT",
            "JOBBOARD_LOG_LEVEL",
            "JOBBOARD_JWT_SECRET",
        ] {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn validation_rejects_bad_driver() {
        let mut cfg = Config::default();
        cfg.database.driver = "mongodb".into();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn validation_rejects_bad_reset_link() {
        let mut cfg = Config::default();
        cfg.mailer.reset_link_base = "ftp://example.com/reset".into();
        assert!(validate_config(&cfg).is_err());
        cfg.mailer.reset_link_base = "not a url".into();
        assert!(validate_config(&cfg).is_err());
    }

    #[test]
    fn defaults_validate() {
        let cfg = Config::default();
        validate_config(&cfg).expect("defaults should be valid");
    }
}
