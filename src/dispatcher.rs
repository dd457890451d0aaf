// Delivery of payloads to the dashboard ingest endpoint.

use crate::error::DeliveryError;
use crate::models::MetricsPayload;
use crate::version;
use std::time::Duration;
use tracing::{info, warn};

/// Bound on a single POST, connect included.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of one `send`. Failures are reported here, never as `Err`.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered { status: u16 },
    Dropped(DeliveryError),
}

/// Fire-and-forget, at-most-once HTTP delivery with bearer authentication.
pub struct Dispatcher {
    client: reqwest::Client,
    url: reqwest::Url,
    secret: String,
}

impl Dispatcher {
    pub fn new(url: reqwest::Url, secret: impl Into<String>) -> Result<Self, DeliveryError> {
        Self::with_timeout(url, secret, SEND_TIMEOUT)
    }

    pub fn with_timeout(
        url: reqwest::Url,
        secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", version::NAME, version::VERSION))
            .build()?;
        Ok(Self {
            client,
            url,
            secret: secret.into(),
        })
    }

    /// POST the payload as JSON. Logs the outcome; a failed payload is discarded.
    pub async fn send(&self, payload: &MetricsPayload) -> DeliveryOutcome {
        match self.post(payload).await {
            Ok(status) => {
                info!(
                    server_id = %payload.server_id,
                    cpu = round1(payload.cpu),
                    ram = round1(payload.ram),
                    disk = round1(payload.disk),
                    net_rx_bps = payload.net_rx_bps.round(),
                    net_tx_bps = payload.net_tx_bps.round(),
                    "sent"
                );
                DeliveryOutcome::Delivered { status }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    operation = "send",
                    "send failed"
                );
                DeliveryOutcome::Dropped(e)
            }
        }
    }

    async fn post(&self, payload: &MetricsPayload) -> Result<u16, DeliveryError> {
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.secret)
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(status.as_u16())
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
