//! JSON configuration for the attire assistant.
//!
//! All fields are optional in the file; defaults mirror the documented
//! behavior (GMT, one temperature variable, six forecast hours, one retry).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Variables the normalized current-conditions record is built from.
const CURRENT_RECORD_VARIABLES: [&str; 4] = [
    "temperature_2m",
    "apparent_temperature",
    "is_day",
    "precipitation",
];

/// Variables the normalized hourly record is built from.
const HOURLY_RECORD_VARIABLES: [&str; 4] = [
    "temperature_2m",
    "apparent_temperature",
    "precipitation_probability",
    "uv_index",
];

/// One validation problem, tied to the config field that caused it.
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Everything `validate()` found, split into errors and warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Validation passes when no errors were recorded; warnings never fail it.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error against `field`.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Record a warning against `field`.
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Join all recorded errors into a single displayable line.
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Location and forecast window
    #[serde(default)]
    pub params: ForecastParams,

    /// Response cache and retry policy
    #[serde(default)]
    pub cache: CachePolicy,

    /// Hosted-model settings
    #[serde(default)]
    pub recommender: RecommenderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastParams {
    #[serde(default)]
    pub latitude: f64,

    #[serde(default)]
    pub longitude: f64,

    /// Current-conditions variables, in request order
    #[serde(default = "default_variables")]
    pub current: Vec<String>,

    /// Hourly variables, in request order
    #[serde(default = "default_variables")]
    pub hourly: Vec<String>,

    /// IANA timezone name for local timestamps
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,

    #[serde(default = "default_forecast_hours")]
    pub forecast_hours: u32,
}

fn default_variables() -> Vec<String> {
    vec!["temperature_2m".to_string()]
}

fn default_timezone() -> String {
    "GMT".to_string()
}

fn default_forecast_days() -> u32 {
    1
}

fn default_forecast_hours() -> u32 {
    6
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            current: default_variables(),
            hourly: default_variables(),
            timezone: default_timezone(),
            forecast_days: default_forecast_days(),
            forecast_hours: default_forecast_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Cached responses expire after this many seconds
    #[serde(default = "default_expire_after")]
    pub expire_after: u64,

    /// Retries after the first attempt on transient failures
    #[serde(default = "default_n_retries")]
    pub n_retries: u32,

    /// Backoff factor in seconds; delay doubles each retry
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_expire_after() -> u64 {
    3600
}

fn default_n_retries() -> u32 {
    1
}

fn default_backoff_factor() -> f64 {
    0.2
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            expire_after: default_expire_after(),
            n_retries: default_n_retries(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Hosted model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Override for the chat-completions endpoint (default: Hugging Face router)
    #[serde(default)]
    pub api_url: Option<String>,

    /// JSON file holding the hosted-model access token
    #[serde(default = "default_credential_file")]
    pub credential_file: PathBuf,

    /// Plain-text prompt template with named placeholders
    #[serde(default = "default_template_file")]
    pub template_file: PathBuf,

    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,

    /// Generation calls fail after this many seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "google/gemma-2b-it".to_string()
}

fn default_credential_file() -> PathBuf {
    PathBuf::from("hf_key.json")
}

fn default_template_file() -> PathBuf {
    PathBuf::from("config/template_recommendation.txt")
}

fn default_max_new_tokens() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_url: None,
            credential_file: default_credential_file(),
            template_file: default_template_file(),
            max_new_tokens: default_max_new_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            params: ForecastParams::default(),
            cache: CachePolicy::default(),
            recommender: RecommenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        let config: AppConfig =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        Ok(config)
    }

    /// Load configuration and validate it.
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load(path)?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration.
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if !(-90.0..=90.0).contains(&self.params.latitude) {
            result.add_error("params.latitude", "Latitude must be in [-90, 90]");
        }
        if !(-180.0..=180.0).contains(&self.params.longitude) {
            result.add_error("params.longitude", "Longitude must be in [-180, 180]");
        }
        if self.params.current.is_empty() {
            result.add_error("params.current", "At least one current variable is required");
        }
        if self.params.hourly.is_empty() {
            result.add_error("params.hourly", "At least one hourly variable is required");
        }
        // The normalized records need these variables; a list without them
        // passes the fetch but fails parsing, so flag it up front.
        for field in CURRENT_RECORD_VARIABLES {
            if !self.params.current.iter().any(|v| v == field) {
                result.add_warning(
                    "params.current",
                    format!("Variable `{field}` is not requested; every fetch will fail to parse"),
                );
            }
        }
        for field in HOURLY_RECORD_VARIABLES {
            if !self.params.hourly.iter().any(|v| v == field) {
                result.add_warning(
                    "params.hourly",
                    format!("Variable `{field}` is not requested; every fetch will fail to parse"),
                );
            }
        }
        if self.params.forecast_hours == 0 {
            result.add_error("params.forecast_hours", "Forecast hours must be greater than 0");
        }
        if self.params.forecast_days == 0 {
            result.add_error("params.forecast_days", "Forecast days must be at least 1");
        }
        if self.params.timezone.parse::<chrono_tz::Tz>().is_err() {
            result.add_error(
                "params.timezone",
                format!("Unknown timezone: {}", self.params.timezone),
            );
        }

        if self.cache.expire_after == 0 {
            result.add_warning("cache.expire_after", "Response caching disabled (0 seconds)");
        }
        if self.cache.backoff_factor < 0.0 {
            result.add_error("cache.backoff_factor", "Backoff factor must be non-negative");
        }

        if let Some(api_url) = &self.recommender.api_url {
            self.validate_url(api_url, "recommender.api_url", &mut result);
        }
        if self.recommender.model.is_empty() {
            result.add_error("recommender.model", "Model identifier must not be empty");
        }
        if self.recommender.max_new_tokens == 0 {
            result.add_warning(
                "recommender.max_new_tokens",
                "Generation limited to 0 tokens; responses will be empty",
            );
        }
        if self.recommender.timeout_secs == 0 {
            result.add_error(
                "recommender.timeout_secs",
                "Generation timeout must be greater than 0",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {e}"));
            }
        }
    }
}

/// Access token for the model-hosting service.
///
/// Loaded explicitly and handed to the generator's constructor; never
/// injected into the process environment.
#[derive(Debug, Clone, Deserialize)]
pub struct Credential {
    pub key: String,
}

impl Credential {
    /// Load the credential from a JSON file of the form `{"key": "..."}`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

        let credential: Credential =
            serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if credential.key.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{}: credential key is empty",
                path.display()
            )));
        }

        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.params.latitude, 0.0);
        assert_eq!(config.params.longitude, 0.0);
        assert_eq!(config.params.current, vec!["temperature_2m"]);
        assert_eq!(config.params.hourly, vec!["temperature_2m"]);
        assert_eq!(config.params.timezone, "GMT");
        assert_eq!(config.params.forecast_days, 1);
        assert_eq!(config.params.forecast_hours, 6);
        assert_eq!(config.cache.expire_after, 3600);
        assert_eq!(config.cache.n_retries, 1);
        assert_eq!(config.cache.backoff_factor, 0.2);
        assert_eq!(config.recommender.max_new_tokens, 200);
        assert_eq!(config.recommender.timeout_secs, 120);
    }

    #[test]
    fn test_valid_default_config() {
        let config = AppConfig::default();
        let result = config.validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_load_full_config() {
        let file = write_temp(
            r#"{
                "params": {
                    "latitude": -34.6,
                    "longitude": -58.4,
                    "current": ["temperature_2m", "apparent_temperature", "is_day", "precipitation"],
                    "hourly": ["temperature_2m", "apparent_temperature", "precipitation_probability", "uv_index"],
                    "timezone": "America/Argentina/Buenos_Aires",
                    "forecast_days": 1,
                    "forecast_hours": 6
                },
                "cache": {"expire_after": 3600, "n_retries": 2, "backoff_factor": 0.5}
            }"#,
        );
        let (config, _) = AppConfig::load_validated(file.path()).unwrap();
        assert_eq!(config.params.latitude, -34.6);
        assert_eq!(config.params.current.len(), 4);
        assert_eq!(config.cache.n_retries, 2);
    }

    #[test]
    fn test_missing_config_file() {
        let err = AppConfig::load(Path::new("/nonexistent/attire.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_malformed_config_file() {
        let file = write_temp("{not json");
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_latitude_out_of_range() {
        let mut config = AppConfig::default();
        config.params.latitude = 120.0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "params.latitude"));
    }

    #[test]
    fn test_unknown_timezone() {
        let mut config = AppConfig::default();
        config.params.timezone = "Mars/Olympus_Mons".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "params.timezone"));
    }

    #[test]
    fn test_empty_variable_list() {
        let mut config = AppConfig::default();
        config.params.current.clear();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "params.current"));
    }

    #[test]
    fn test_default_variable_lists_warn_about_unparseable_fetches() {
        // The documented defaults request only temperature_2m, which the
        // record parser cannot work with alone; that should be visible at
        // startup, not as a runtime fetch failure.
        let config = AppConfig::default();
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "params.current" && w.message.contains("apparent_temperature")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "params.hourly" && w.message.contains("uv_index")));
    }

    #[test]
    fn test_complete_variable_lists_produce_no_variable_warnings() {
        let mut config = AppConfig::default();
        config.params.current = vec![
            "temperature_2m".to_string(),
            "apparent_temperature".to_string(),
            "is_day".to_string(),
            "precipitation".to_string(),
        ];
        config.params.hourly = vec![
            "temperature_2m".to_string(),
            "apparent_temperature".to_string(),
            "precipitation_probability".to_string(),
            "uv_index".to_string(),
        ];
        let result = config.validate();
        assert!(result.is_valid());
        assert!(!result
            .warnings
            .iter()
            .any(|w| w.field == "params.current" || w.field == "params.hourly"));
    }

    #[test]
    fn test_zero_expiry_is_warning() {
        let mut config = AppConfig::default();
        config.cache.expire_after = 0;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "cache.expire_after"));
    }

    #[test]
    fn test_invalid_api_url_scheme() {
        let mut config = AppConfig::default();
        config.recommender.api_url = Some("ftp://models.example.com".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }

    #[test]
    fn test_credential_load() {
        let file = write_temp(r#"{"key": "hf_abc123"}"#);
        let credential = Credential::load(file.path()).unwrap();
        assert_eq!(credential.key, "hf_abc123");
    }

    #[test]
    fn test_credential_empty_key() {
        let file = write_temp(r#"{"key": ""}"#);
        let err = Credential::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_credential_missing_file() {
        let err = Credential::load(Path::new("/nonexistent/hf_key.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
