//! HTTP transport boundary for the forecast endpoint.

use async_trait::async_trait;
use std::time::Duration;

use crate::types::TransportError;

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// One GET against the forecast endpoint. Implementations return the raw
/// response body; tests substitute mocks.
#[async_trait]
pub trait ForecastTransport: Send + Sync {
    async fn get(&self, params: &[(String, String)]) -> Result<String, TransportError>;
}

/// Production transport over `reqwest` with a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_endpoint(FORECAST_URL)
    }

    /// Point the transport at a different endpoint (tests, self-hosted API).
    pub fn with_endpoint(endpoint: &str) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait]
impl ForecastTransport for HttpTransport {
    async fn get(&self, params: &[(String, String)]) -> Result<String, TransportError> {
        let response = self.client.get(&self.endpoint).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Server {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
