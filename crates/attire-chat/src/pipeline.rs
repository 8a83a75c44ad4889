//! The fetch → format → generate pipeline.
//!
//! One synchronous run per user interaction; the only blocking operations
//! are the forecast fetch (bounded by the retry policy) and the generation
//! call (bounded by its configured timeout).

use std::str::FromStr;
use std::sync::Arc;

use attire_recommend::{Generator, PromptTemplate};
use attire_weather::{render_records, WeatherClient, WeatherQuery};

use crate::error::ChatError;

/// What the assistant answers with: a clothing recommendation or the plain
/// weather summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoMode {
    Attire,
    Weather,
}

impl InfoMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoMode::Attire => "attire",
            InfoMode::Weather => "weather",
        }
    }
}

impl FromStr for InfoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "attire" => Ok(InfoMode::Attire),
            "weather" => Ok(InfoMode::Weather),
            other => Err(format!("unknown mode '{other}', expected attire or weather")),
        }
    }
}

pub struct ChatPipeline {
    weather: WeatherClient,
    query: WeatherQuery,
    template: PromptTemplate,
    generator: Arc<dyn Generator>,
}

impl ChatPipeline {
    pub fn new(
        weather: WeatherClient,
        query: WeatherQuery,
        template: PromptTemplate,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            weather,
            query,
            template,
            generator,
        }
    }

    /// Produce one bot response for the given display mode.
    pub async fn respond(&self, mode: InfoMode) -> Result<String, ChatError> {
        match mode {
            InfoMode::Weather => self.weather_summary().await,
            InfoMode::Attire => self.attire_recommendation().await,
        }
    }

    async fn weather_summary(&self) -> Result<String, ChatError> {
        let (current, _hourly) = self.weather.fetch_weather(&self.query).await?;
        Ok(format!(
            "The current temperature is {}°C, the apparent temperature is {}°C, \
             and the probability of precipitation is {}%.",
            current.temperature, current.apparent_temperature, current.precipitation
        ))
    }

    async fn attire_recommendation(&self) -> Result<String, ChatError> {
        let (current, hourly) = self.weather.fetch_weather(&self.query).await?;

        let prompt = self.template.fill(
            &current.date,
            &self.query.timezone,
            &render_records(std::slice::from_ref(&current)),
            &render_records(&hourly),
        )?;

        tracing::debug!(prompt_len = prompt.len(), "prompt formatted");
        let recommendation = self.generator.generate(&prompt).await?;
        Ok(recommendation)
    }
}
