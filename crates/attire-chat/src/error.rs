//! Interaction-level errors.
//!
//! The top-level handler renders `user_message()` as a failed bot turn
//! instead of crashing the session.

use thiserror::Error;

use attire_recommend::RecommendError;
use attire_weather::{TransportError, WeatherError};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("weather fetch failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("recommendation failed: {0}")]
    Recommend(#[from] RecommendError),
}

impl ChatError {
    /// A message suitable for display in the conversation log.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Weather(WeatherError::Transport(TransportError::Timeout)) => {
                "The weather service timed out. Please try again."
            }
            ChatError::Weather(WeatherError::Transport(_)) => {
                "Unable to reach the weather service. Please try again."
            }
            ChatError::Weather(WeatherError::DataShape(_)) => {
                "The weather service returned unexpected data. Please try again later."
            }
            ChatError::Weather(WeatherError::InvalidQuery(_)) => {
                "The configured location or forecast window is invalid. Check your settings."
            }
            ChatError::Weather(WeatherError::Cache(_)) => {
                "Weather data could not be cached. Please try again."
            }
            ChatError::Recommend(RecommendError::Format(_)) => {
                "The recommendation template is incomplete. Check your settings."
            }
            ChatError::Recommend(RecommendError::Template(_)) => {
                "The recommendation template could not be read. Check your settings."
            }
            ChatError::Recommend(RecommendError::Generation(_)) => {
                "The recommendation model is unavailable right now. Please try again."
            }
        }
    }
}
