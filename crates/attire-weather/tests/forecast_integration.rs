//! Integration tests for the forecast client using wiremock.
//!
//! These exercise the full HTTP path: transport, retry policy, cache, and
//! response parsing against a mock forecast endpoint.

use std::sync::Arc;

use attire_weather::{
    HttpTransport, ResponseCache, RetryConfig, WeatherClient, WeatherError, WeatherQuery,
};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// 2024-03-18 12:00:00 UTC
const START: i64 = 1_710_763_200;

fn query() -> WeatherQuery {
    WeatherQuery {
        latitude: -34.6,
        longitude: -58.4,
        current: vec![
            "temperature_2m".to_string(),
            "apparent_temperature".to_string(),
            "is_day".to_string(),
            "precipitation".to_string(),
        ],
        hourly: vec![
            "temperature_2m".to_string(),
            "apparent_temperature".to_string(),
            "precipitation_probability".to_string(),
            "uv_index".to_string(),
        ],
        timezone: "America/Argentina/Buenos_Aires".to_string(),
        forecast_days: 1,
        forecast_hours: 3,
    }
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "current": {"time": START, "values": [24.0, 26.0, 1, 10.0]},
        "hourly": {
            "time": START,
            "time_end": START + 3 * 3600,
            "interval": 3600,
            "values": [
                [21.0, 22.0, 23.0],
                [23.0, 24.0, 25.0],
                [10.0, 20.0, 30.0],
                [3.0, 4.0, 5.0]
            ]
        }
    })
}

fn client_for(server: &MockServer, n_retries: u32) -> WeatherClient {
    let transport = HttpTransport::with_endpoint(&server.uri()).unwrap();
    WeatherClient::with_transport(
        Arc::new(transport),
        ResponseCache::in_memory(3600),
        RetryConfig::new(n_retries, 0.0),
    )
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("latitude", "-34.6"))
        .and(query_param("timezone", "America/Argentina/Buenos_Aires"))
        .and(query_param(
            "current",
            "temperature_2m,apparent_temperature,is_day,precipitation",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    let (current, hourly) = client.fetch_weather(&query()).await.unwrap();

    assert_eq!(current.temperature, 24.0);
    assert_eq!(current.date, "2024-03-18 09:00");
    assert_eq!(hourly.len(), 3);
    assert_eq!(hourly[2].uv_index, 5.0);
}

#[tokio::test]
async fn test_cache_hit_issues_single_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    let first = client.fetch_weather(&query()).await.unwrap();
    let second = client.fetch_weather(&query()).await.unwrap();

    assert_eq!(first, second);
    // expect(1) is verified when the mock server drops
}

#[tokio::test]
async fn test_server_error_then_success_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    let result = client.fetch_weather(&query()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_persistent_server_error_surfaces_transport_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    let err = client.fetch_weather(&query()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)));
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 3);
    let err = client.fetch_weather(&query()).await.unwrap_err();
    assert!(matches!(err, WeatherError::Transport(_)));
}

#[tokio::test]
async fn test_short_response_is_data_shape_error() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "current": {"time": START, "values": [24.0, 26.0]},
        "hourly": {
            "time": START,
            "time_end": START + 3 * 3600,
            "interval": 3600,
            "values": [[21.0, 22.0, 23.0], [23.0, 24.0, 25.0], [10.0, 20.0, 30.0], [3.0, 4.0, 5.0]]
        }
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server, 1);
    let err = client.fetch_weather(&query()).await.unwrap_err();
    assert!(matches!(err, WeatherError::DataShape(_)));
}
