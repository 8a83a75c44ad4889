//! Forecast retrieval for the attire assistant.
//!
//! Fetches current and hourly conditions from the Open-Meteo forecast API
//! through a transport that caches identical queries on disk and retries
//! transient failures with exponential backoff.

pub mod cache;
pub mod client;
pub mod response;
pub mod retry;
pub mod transport;
pub mod types;

pub use cache::ResponseCache;
pub use client::WeatherClient;
pub use response::parse_forecast;
pub use retry::RetryConfig;
pub use transport::{ForecastTransport, HttpTransport};
pub use types::{
    render_records, CurrentConditions, HourlyRecord, TransportError, WeatherError, WeatherQuery,
};
