//! Remote distance detector reached over HTTP.
//!
//! The detector owns the camera and the face-landmark pipeline and exposes
//! `GET /check_distance` returning `{"distance_ok": true}`. Any other fields
//! in the body are ignored.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

use acuity_core::traits::DistanceSignal;

use crate::error::SignalError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Distance signal backed by a remote detector.
pub struct HttpSignal {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CheckDistanceResponse {
    distance_ok: bool,
}

impl HttpSignal {
    pub fn new(base_url: &str, timeout_secs: Option<u64>) -> Result<Self, SignalError> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(SignalError::InvalidConfig(
                "timeout_secs must be at least 1".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SignalError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl DistanceSignal for HttpSignal {
    fn name(&self) -> &str {
        "http"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn distance_ok(&self) -> anyhow::Result<bool> {
        let response = self
            .client
            .get(format!("{}/check_distance", self.base_url))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SignalError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    SignalError::NetworkError(format!(
                        "distance detector not reachable at {}",
                        self.base_url
                    ))
                } else {
                    SignalError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(SignalError::DetectorError {
                status,
                message: body,
            }
            .into());
        }

        let body: CheckDistanceResponse = response
            .json()
            .await
            .map_err(|e| SignalError::InvalidResponse(format!("failed to parse response: {e}")))?;

        Ok(body.distance_ok)
    }
}
