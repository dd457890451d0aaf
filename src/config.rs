// Agent configuration: optional TOML file (CONFIG_FILE) overridden by environment variables.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_SERVER_ID: &str = "server-1";
pub const DEFAULT_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_STATS_LOG_INTERVAL_SECS: u64 = 60;

#[derive(Clone)]
pub struct AgentConfig {
    pub dashboard_url: reqwest::Url,
    pub ingest_secret: String,
    pub server_id: String,
    pub interval_ms: u64,
    /// How often the scheduler logs its counters at INFO level.
    pub stats_log_interval_secs: u64,
    /// Interface whose counters feed the rate tracker; the default-route interface when unset.
    pub net_interface: Option<String>,
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("dashboard_url", &self.dashboard_url.as_str())
            .field("ingest_secret", &"<redacted>")
            .field("server_id", &self.server_id)
            .field("interval_ms", &self.interval_ms)
            .field("stats_log_interval_secs", &self.stats_log_interval_secs)
            .field("net_interface", &self.net_interface)
            .finish()
    }
}

/// Shape of the optional TOML file. Every key may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    dashboard_url: Option<String>,
    ingest_secret: Option<String>,
    server_id: Option<String>,
    interval_ms: Option<u64>,
    stats_log_interval_secs: Option<u64>,
    net_interface: Option<String>,
}

impl AgentConfig {
    /// Load from `CONFIG_FILE` (if set) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = match std::env::var("CONFIG_FILE") {
            Ok(path) if !path.is_empty() => Some(
                std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::File { path, source })?,
            ),
            _ => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build from optional TOML text plus a variable lookup; lookup values win over the file.
    pub fn from_sources<F>(file_toml: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match file_toml {
            Some(s) => toml::from_str(s)?,
            None => FileConfig::default(),
        };
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let text = |env: Option<String>, file: Option<String>| {
            env.or(file.filter(|v| !v.trim().is_empty()))
        };

        let dashboard_url = text(var("DASHBOARD_URL"), file.dashboard_url)
            .ok_or(ConfigError::Missing("DASHBOARD_URL"))?;
        let ingest_secret = text(var("INGEST_SECRET"), file.ingest_secret)
            .ok_or(ConfigError::Missing("INGEST_SECRET"))?;
        let server_id = text(var("SERVER_ID"), file.server_id)
            .unwrap_or_else(|| DEFAULT_SERVER_ID.to_string());
        let interval_ms = match var("INTERVAL_MS") {
            Some(v) => parse_u64("INTERVAL_MS", &v)?,
            None => file.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS),
        };
        let stats_log_interval_secs = match var("STATS_LOG_INTERVAL_SECS") {
            Some(v) => parse_u64("STATS_LOG_INTERVAL_SECS", &v)?,
            None => file
                .stats_log_interval_secs
                .unwrap_or(DEFAULT_STATS_LOG_INTERVAL_SECS),
        };
        let net_interface = text(var("NET_INTERFACE"), file.net_interface);

        let config = AgentConfig {
            dashboard_url: parse_url(dashboard_url.trim())?,
            ingest_secret,
            server_id: server_id.trim().to_string(),
            interval_ms,
            stats_log_interval_secs,
            net_interface: net_interface.map(|s| s.trim().to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "INTERVAL_MS",
                reason: "must be > 0".into(),
            });
        }
        if self.stats_log_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "STATS_LOG_INTERVAL_SECS",
                reason: "must be > 0".into(),
            });
        }
        Ok(())
    }
}

fn parse_u64(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?} is not a whole number ({e})"),
    })
}

fn parse_url(value: &str) -> Result<reqwest::Url, ConfigError> {
    let url = reqwest::Url::parse(value).map_err(|e| ConfigError::Invalid {
        key: "DASHBOARD_URL",
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            key: "DASHBOARD_URL",
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}
