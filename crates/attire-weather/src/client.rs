//! Forecast client with transparent caching and retry.

use std::sync::Arc;

use crate::cache::ResponseCache;
use crate::response::parse_forecast;
use crate::retry::{with_retry, RetryConfig};
use crate::transport::{ForecastTransport, HttpTransport};
use crate::types::{CurrentConditions, HourlyRecord, WeatherError, WeatherQuery};

pub struct WeatherClient {
    transport: Arc<dyn ForecastTransport>,
    cache: ResponseCache,
    retry: RetryConfig,
}

impl WeatherClient {
    /// Client against the production forecast endpoint.
    pub fn new(cache: ResponseCache, retry: RetryConfig) -> Result<Self, WeatherError> {
        let transport = HttpTransport::new().map_err(WeatherError::Transport)?;
        Ok(Self::with_transport(Arc::new(transport), cache, retry))
    }

    /// Client over an explicit transport (tests, alternate endpoints).
    pub fn with_transport(
        transport: Arc<dyn ForecastTransport>,
        cache: ResponseCache,
        retry: RetryConfig,
    ) -> Self {
        Self {
            transport,
            cache,
            retry,
        }
    }

    /// Fetch current conditions and the hourly forecast for `query`.
    ///
    /// An unexpired response for an identical query is reused without a
    /// network call. Otherwise the endpoint is fetched through the retry
    /// policy and the raw payload is stored before parsing; transport
    /// failures leave the cache untouched.
    pub async fn fetch_weather(
        &self,
        query: &WeatherQuery,
    ) -> Result<(CurrentConditions, Vec<HourlyRecord>), WeatherError> {
        query.validate()?;
        let key = query.cache_key()?;

        if let Some(raw) = self.cache.get(&key) {
            tracing::debug!(
                latitude = query.latitude,
                longitude = query.longitude,
                "forecast cache hit"
            );
            return parse_forecast(&raw, query);
        }

        let params = query.to_params();
        let transport = Arc::clone(&self.transport);
        let raw = with_retry(&self.retry, || {
            let transport = Arc::clone(&transport);
            let params = params.clone();
            async move { transport.get(&params).await }
        })
        .await
        .map_err(WeatherError::Transport)?;

        self.cache.store(&key, &raw);
        tracing::info!(
            latitude = query.latitude,
            longitude = query.longitude,
            "forecast fetched and cached"
        );

        parse_forecast(&raw, query)
    }
}
