use std::time::Duration;

use crate::domain::repository::{DeliveryTransport, SiteProbe};
use crate::domain::types::{DeliveryFailure, ProbeFailure};

/// Outbound delivery call: JSON POST bounded by `DELIVERY_HTTP_TIMEOUT`.
/// Any timeout, connect error, or non-2xx becomes a `DeliveryFailure` for
/// the dispatcher to record; nothing here retries.
#[derive(Clone)]
pub struct HttpDeliveryTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpDeliveryTransport {
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl DeliveryTransport for HttpDeliveryTransport {
    async fn send(&self, url: &str, body: &serde_json::Value) -> Result<(), DeliveryFailure> {
        let resp = self
            .client
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| DeliveryFailure::new(format!("send failed: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let snippet: String = resp
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(600)
            .collect();
        Err(DeliveryFailure::new(format!("{}: {snippet}", status.as_u16())))
    }
}

/// Site reachability probe: GET bounded by `SITE_CHECK_TIMEOUT`. Non-2xx and
/// transport errors both count as a failed attempt, not a scheduler fault.
#[derive(Clone)]
pub struct HttpSiteProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpSiteProbe {
    pub fn new(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

impl SiteProbe for HttpSiteProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeFailure> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProbeFailure::new(format!("probe failed: {e}")))?;
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ProbeFailure::new(format!("status {}", status.as_u16())))
        }
    }
}
