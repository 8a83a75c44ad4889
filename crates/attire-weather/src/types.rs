//! Query and normalized forecast types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A forecast request. Immutable once constructed; its canonical JSON
/// encoding identifies a cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// Current-conditions variables, in request order
    pub current: Vec<String>,
    /// Hourly variables, in request order
    pub hourly: Vec<String>,
    /// IANA timezone name for local timestamps
    pub timezone: String,
    pub forecast_days: u32,
    pub forecast_hours: u32,
}

impl WeatherQuery {
    /// Check the input domain before any network traffic.
    pub fn validate(&self) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "latitude {} outside [-90, 90]",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(WeatherError::InvalidQuery(format!(
                "longitude {} outside [-180, 180]",
                self.longitude
            )));
        }
        if self.current.is_empty() {
            return Err(WeatherError::InvalidQuery(
                "no current variables requested".to_string(),
            ));
        }
        if self.hourly.is_empty() {
            return Err(WeatherError::InvalidQuery(
                "no hourly variables requested".to_string(),
            ));
        }
        if self.forecast_hours == 0 {
            return Err(WeatherError::InvalidQuery(
                "forecast_hours must be greater than 0".to_string(),
            ));
        }
        if self.forecast_days == 0 {
            return Err(WeatherError::InvalidQuery(
                "forecast_days must be at least 1".to_string(),
            ));
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(WeatherError::InvalidQuery(format!(
                "unknown timezone: {}",
                self.timezone
            )));
        }
        Ok(())
    }

    /// Canonical cache key. Field order is fixed by the struct definition,
    /// so identical queries always produce identical keys.
    pub(crate) fn cache_key(&self) -> Result<String, WeatherError> {
        serde_json::to_string(self).map_err(|e| WeatherError::Cache(e.to_string()))
    }

    /// Encode the query as forecast-endpoint parameters.
    pub(crate) fn to_params(&self) -> Vec<(String, String)> {
        vec![
            ("latitude".to_string(), self.latitude.to_string()),
            ("longitude".to_string(), self.longitude.to_string()),
            ("current".to_string(), self.current.join(",")),
            ("hourly".to_string(), self.hourly.join(",")),
            ("timezone".to_string(), self.timezone.clone()),
            ("forecast_days".to_string(), self.forecast_days.to_string()),
            ("forecast_hours".to_string(), self.forecast_hours.to_string()),
        ]
    }
}

/// Normalized current conditions, one record per fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Local timestamp, `YYYY-MM-DD HH:MM`
    pub date: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub is_day: bool,
    pub precipitation: f64,
}

impl fmt::Display for CurrentConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{date: {}, temperature_2m: {}, apparent_temperature: {}, is_day: {}, precipitation: {}}}",
            self.date, self.temperature, self.apparent_temperature, self.is_day, self.precipitation
        )
    }
}

/// One row of the hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Local timestamp, `YYYY-MM-DD HH:MM`
    pub date: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub precipitation_probability: f64,
    pub uv_index: f64,
}

impl fmt::Display for HourlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{date: {}, temperature_2m: {}, apparent_temperature: {}, precipitation_probability: {}, uv_index: {}}}",
            self.date,
            self.temperature,
            self.apparent_temperature,
            self.precipitation_probability,
            self.uv_index
        )
    }
}

/// Render records as a bracketed list for prompt substitution.
/// Output is deterministic for identical inputs.
pub fn render_records<T: fmt::Display>(records: &[T]) -> String {
    let rows: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    format!("[{}]", rows.join(", "))
}

/// Transport-level failures. The only retryable error class.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("server returned status {status}")]
    Server { status: u16 },

    #[error("http error: {0}")]
    Http(String),
}

impl TransportError {
    /// Transient failures are retried; client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Connect(_) => true,
            TransportError::Server { status } => {
                *status >= 500 || *status == 429 || *status == 408
            }
            TransportError::Http(_) => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            TransportError::Timeout
        } else if error.is_connect() {
            TransportError::Connect(error.to_string())
        } else if let Some(status) = error.status() {
            TransportError::Server {
                status: status.as_u16(),
            }
        } else {
            TransportError::Http(error.to_string())
        }
    }
}

/// Weather client errors.
///
/// `DataShape` is reported distinctly from `Transport`: a short or
/// misaligned response is never retried.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("fetch failed: {0}")]
    Transport(#[from] TransportError),

    #[error("malformed forecast response: {0}")]
    DataShape(String),

    #[error("cache error: {0}")]
    Cache(String),
}
