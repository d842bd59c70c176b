//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Dashboard server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Projects refreshed when a request names none.
    pub projects: Vec<String>,
    /// Background refresh period. `None` disables it.
    pub refresh_interval: Option<Duration>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ADMIN_ADDR` | Server bind address | `127.0.0.1:8788` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:chat-stats.db?mode=rwc` |
    /// | `DASHBOARD_PROJECTS` | Comma-separated project ids | (empty) |
    /// | `ADMIN_REFRESH_SECS` | Background refresh period, 0 disables | `0` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ADMIN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8788".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:chat-stats.db?mode=rwc".to_string());

        let projects = env::var("DASHBOARD_PROJECTS")
            .map(|raw| parse_project_list(&raw))
            .unwrap_or_default();

        let refresh_interval = match env::var("ADMIN_REFRESH_SECS") {
            Ok(raw) => parse_refresh_interval(&raw)?,
            Err(_) => None,
        };

        Ok(Self {
            addr,
            database_url,
            projects,
            refresh_interval,
        })
    }
}

/// Split a comma-separated project list, skipping empty entries.
pub fn parse_project_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_refresh_interval(raw: &str) -> Result<Option<Duration>, ConfigError> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidRefreshInterval(raw.to_string()))?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ADMIN_ADDR format")]
    InvalidAddr,

    #[error("ADMIN_REFRESH_SECS must be a whole number of seconds, got {0:?}")]
    InvalidRefreshInterval(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_list() {
        assert_eq!(
            parse_project_list(" shop, cafe ,,bakery "),
            vec!["shop", "cafe", "bakery"]
        );
        assert!(parse_project_list("").is_empty());
        assert!(parse_project_list(" , ").is_empty());
    }

    #[test]
    fn test_parse_refresh_interval() {
        assert_eq!(parse_refresh_interval("0").unwrap(), None);
        assert_eq!(
            parse_refresh_interval(" 30 ").unwrap(),
            Some(Duration::from_secs(30))
        );
        assert!(matches!(
            parse_refresh_interval("soon"),
            Err(ConfigError::InvalidRefreshInterval(_))
        ));
    }
}
