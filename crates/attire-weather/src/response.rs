//! Wire format and normalization of forecast responses.
//!
//! The endpoint returns the requested variables positionally, in request
//! order. Each position is paired with its requested name and the returned
//! count is validated against the requested count, so a short or reordered
//! response surfaces as a `DataShape` error instead of silent misalignment.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::collections::HashMap;

use crate::types::{CurrentConditions, HourlyRecord, WeatherError, WeatherQuery};

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current: CurrentBlock,
    pub hourly: HourlyBlock,
}

/// Current-conditions block: one value per requested variable.
#[derive(Debug, Deserialize)]
pub struct CurrentBlock {
    /// UTC epoch seconds
    pub time: i64,
    pub values: Vec<f64>,
}

/// Hourly block: one value array per requested variable, plus the time
/// axis metadata (start, exclusive end, sampling interval).
#[derive(Debug, Deserialize)]
pub struct HourlyBlock {
    /// UTC epoch seconds, start of the window
    pub time: i64,
    /// UTC epoch seconds, end of the window (excluded)
    pub time_end: i64,
    /// Sampling interval in seconds
    pub interval: i64,
    pub values: Vec<Vec<f64>>,
}

/// Parse a raw forecast payload into the two normalized tables.
pub fn parse_forecast(
    raw: &str,
    query: &WeatherQuery,
) -> Result<(CurrentConditions, Vec<HourlyRecord>), WeatherError> {
    let response: ForecastResponse =
        serde_json::from_str(raw).map_err(|e| WeatherError::DataShape(e.to_string()))?;

    let tz: Tz = query
        .timezone
        .parse()
        .map_err(|_| WeatherError::InvalidQuery(format!("unknown timezone: {}", query.timezone)))?;

    let current = parse_current(&response.current, &query.current, tz)?;
    let hourly = parse_hourly(&response.hourly, &query.hourly, tz)?;
    Ok((current, hourly))
}

fn parse_current(
    block: &CurrentBlock,
    requested: &[String],
    tz: Tz,
) -> Result<CurrentConditions, WeatherError> {
    if block.values.len() != requested.len() {
        return Err(WeatherError::DataShape(format!(
            "current block has {} values for {} requested variables",
            block.values.len(),
            requested.len()
        )));
    }

    let by_name: HashMap<&str, f64> = requested
        .iter()
        .map(String::as_str)
        .zip(block.values.iter().copied())
        .collect();

    let field = |name: &str| -> Result<f64, WeatherError> {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| WeatherError::DataShape(format!("missing current variable `{name}`")))
    };

    let is_day = match field("is_day")? {
        v if v == 1.0 => true,
        v if v == 0.0 => false,
        v => {
            return Err(WeatherError::DataShape(format!(
                "is_day indicator must be 0 or 1, got {v}"
            )))
        }
    };

    Ok(CurrentConditions {
        date: local_timestamp(block.time, tz)?,
        temperature: field("temperature_2m")?,
        apparent_temperature: field("apparent_temperature")?,
        is_day,
        precipitation: field("precipitation")?,
    })
}

fn parse_hourly(
    block: &HourlyBlock,
    requested: &[String],
    tz: Tz,
) -> Result<Vec<HourlyRecord>, WeatherError> {
    if block.values.len() != requested.len() {
        return Err(WeatherError::DataShape(format!(
            "hourly block has {} variable arrays for {} requested variables",
            block.values.len(),
            requested.len()
        )));
    }
    if block.interval <= 0 {
        return Err(WeatherError::DataShape(format!(
            "hourly interval must be positive, got {}",
            block.interval
        )));
    }
    if block.time_end < block.time {
        return Err(WeatherError::DataShape(
            "hourly window ends before it starts".to_string(),
        ));
    }

    // Left-inclusive axis: first timestamp is the window start, the end
    // boundary is excluded.
    let mut axis = Vec::new();
    let mut t = block.time;
    while t < block.time_end {
        axis.push(local_timestamp(t, tz)?);
        t += block.interval;
    }

    let by_name: HashMap<&str, &Vec<f64>> = requested
        .iter()
        .map(String::as_str)
        .zip(block.values.iter())
        .collect();

    let series = |name: &str| -> Result<&Vec<f64>, WeatherError> {
        let values = by_name
            .get(name)
            .copied()
            .ok_or_else(|| WeatherError::DataShape(format!("missing hourly variable `{name}`")))?;
        if values.len() != axis.len() {
            return Err(WeatherError::DataShape(format!(
                "hourly variable `{name}` has {} values for {} timestamps",
                values.len(),
                axis.len()
            )));
        }
        Ok(values)
    };

    let temperature = series("temperature_2m")?;
    let apparent = series("apparent_temperature")?;
    let precipitation = series("precipitation_probability")?;
    let uv = series("uv_index")?;

    Ok(axis
        .into_iter()
        .enumerate()
        .map(|(i, date)| HourlyRecord {
            date,
            temperature: temperature[i],
            apparent_temperature: apparent[i],
            precipitation_probability: precipitation[i],
            uv_index: uv[i],
        })
        .collect())
}

/// Convert UTC epoch seconds to a local timestamp without seconds precision.
fn local_timestamp(epoch: i64, tz: Tz) -> Result<String, WeatherError> {
    let utc: DateTime<Utc> = Utc
        .timestamp_opt(epoch, 0)
        .single()
        .ok_or_else(|| WeatherError::DataShape(format!("timestamp {epoch} out of range")))?;
    Ok(utc.with_timezone(&tz).format(LOCAL_FORMAT).to_string())
}
