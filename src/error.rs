// Error taxonomy: configuration (fatal), metric queries and delivery (per tick, logged)

use thiserror::Error;

/// Startup configuration problems. Fatal: the agent never starts its scheduler.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration {0}")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("cannot read config file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A system metric read failed. Caught per tick; never stops the scheduler.
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct MetricQueryError {
    pub operation: &'static str,
    #[source]
    pub source: anyhow::Error,
}

impl MetricQueryError {
    pub fn new(operation: &'static str, source: anyhow::Error) -> Self {
        Self { operation, source }
    }
}

/// A payload could not be delivered. Logged and dropped; never retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dashboard responded with status {0}")]
    Status(u16),
}

impl DeliveryError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DeliveryError::Transport(e) if e.is_timeout())
    }
}
