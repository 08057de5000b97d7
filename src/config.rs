//! Configuration management for the `LocalCast` service
//!
//! Handles loading configuration from files, environment variables and a
//! `.env` file, and provides validation for all configuration settings.

use crate::PodcastError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `LocalCast` service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PodcastConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream data provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Completion provider settings
    #[serde(default)]
    pub narration: NarrationConfig,
    /// Text-to-speech settings
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// OpenTelemetry export settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the pre-built frontend
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// IANA timezone used for the local time in the prompt
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Upper bound for handling a single request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
    pub tls_cert_path: Option<String>,
    pub tls_key_path: Option<String>,
}

/// Settings shared by the five data adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Timeout applied to every outbound adapter call, in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_seconds: u32,
    /// City used when reverse geocoding fails
    #[serde(default = "default_fallback_city")]
    pub fallback_city: String,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub landmarks: LandmarksConfig,
}

/// Weather-by-coordinate API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
}

/// Reverse geocoding API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
}

/// News search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_news_base_url")]
    pub base_url: String,
}

/// Places search API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_places_base_url")]
    pub base_url: String,
    /// Maximum number of results requested per search
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

/// Encyclopedia geosearch settings (no key required)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarksConfig {
    #[serde(default = "default_landmarks_base_url")]
    pub base_url: String,
    /// Search radius in meters
    #[serde(default = "default_landmarks_radius")]
    pub radius_meters: u32,
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,
}

/// Chat-completion provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_narration_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Completion timeout in seconds
    #[serde(default = "default_narration_timeout")]
    pub timeout_seconds: u32,
}

/// Text-to-speech settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// OpenTelemetry export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    /// OTLP/HTTP collector base URL
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "build".to_string()
}

fn default_timezone() -> String {
    "Europe/London".to_string()
}

fn default_request_timeout() -> u32 {
    180
}

fn default_provider_timeout() -> u32 {
    10
}

fn default_fallback_city() -> String {
    "the local area".to_string()
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.opencagedata.com".to_string()
}

fn default_news_base_url() -> String {
    "https://newsapi.org".to_string()
}

fn default_places_base_url() -> String {
    "https://api.foursquare.com".to_string()
}

fn default_landmarks_base_url() -> String {
    "https://en.wikipedia.org".to_string()
}

fn default_landmarks_radius() -> u32 {
    1200
}

fn default_result_limit() -> u32 {
    6
}

fn default_narration_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_max_tokens() -> u32 {
    600
}

fn default_temperature() -> f32 {
    0.8
}

fn default_narration_timeout() -> u32 {
    90
}

fn default_speech_base_url() -> String {
    "https://translate.google.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4318".to_string()
}

fn default_service_name() -> String {
    "localcast".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
            timezone: default_timezone(),
            request_timeout_seconds: default_request_timeout(),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_provider_timeout(),
            fallback_city: default_fallback_city(),
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            news: NewsConfig::default(),
            places: PlacesConfig::default(),
            landmarks: LandmarksConfig::default(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_base_url(),
        }
    }
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_news_base_url(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_places_base_url(),
            result_limit: default_result_limit(),
        }
    }
}

impl Default for LandmarksConfig {
    fn default() -> Self {
        Self {
            base_url: default_landmarks_base_url(),
            radius_meters: default_landmarks_radius(),
            result_limit: default_result_limit(),
        }
    }
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_narration_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_seconds: default_narration_timeout(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            language: default_language(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otlp_endpoint(),
            service_name: default_service_name(),
        }
    }
}

/// Plain environment variable names used by earlier deployments
const LEGACY_KEY_VARS: [&str; 5] = [
    "OPENWEATHERMAP_API_KEY",
    "OPENCAGE_API_KEY",
    "NEWS_API_KEY",
    "FOURSQUARE_API_KEY",
    "OPENAI_API_KEY",
];

/// Adapter calls made one after another for each request
const SEQUENTIAL_PROVIDER_CALLS: u32 = 5;

impl PodcastConfig {
    /// Load configuration from `config_path` (default `config.toml`), `.env` and the environment
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        // A missing .env file is the normal case in production
        let _ = dotenvy::dotenv();

        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides, e.g. LOCALCAST_SERVER__PORT=8080
        builder = builder.add_source(
            Environment::with_prefix("LOCALCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PodcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_legacy_keys(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill unset API keys from the plain variable names
    pub fn apply_legacy_keys<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let [weather, geocoding, news, places, narration] = LEGACY_KEY_VARS;
        let slots = [
            (&mut self.providers.weather.api_key, weather),
            (&mut self.providers.geocoding.api_key, geocoding),
            (&mut self.providers.news.api_key, news),
            (&mut self.providers.places.api_key, places),
            (&mut self.narration.api_key, narration),
        ];
        for (slot, name) in slots {
            if slot.is_none() {
                *slot = lookup(name).filter(|value| !value.is_empty());
            }
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.server.timezone.is_empty() {
            self.server.timezone = default_timezone();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.providers.timeout_seconds == 0 {
            self.providers.timeout_seconds = default_provider_timeout();
        }
        if self.providers.fallback_city.trim().is_empty() {
            self.providers.fallback_city = default_fallback_city();
        }
        if self.providers.places.result_limit == 0 {
            self.providers.places.result_limit = default_result_limit();
        }
        if self.providers.landmarks.result_limit == 0 {
            self.providers.landmarks.result_limit = default_result_limit();
        }
        if self.providers.landmarks.radius_meters == 0 {
            self.providers.landmarks.radius_meters = default_landmarks_radius();
        }
        if self.narration.model.is_empty() {
            self.narration.model = default_model();
        }
        if self.narration.max_tokens == 0 {
            self.narration.max_tokens = default_max_tokens();
        }
        if self.narration.timeout_seconds == 0 {
            self.narration.timeout_seconds = default_narration_timeout();
        }
        if self.speech.language.is_empty() {
            self.speech.language = default_language();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Fail with every missing API key listed at once
    pub fn require_api_keys(&self) -> Result<()> {
        let keys = [
            ("providers.weather.api_key", &self.providers.weather.api_key),
            ("providers.geocoding.api_key", &self.providers.geocoding.api_key),
            ("providers.news.api_key", &self.providers.news.api_key),
            ("providers.places.api_key", &self.providers.places.api_key),
            ("narration.api_key", &self.narration.api_key),
        ];

        let missing: Vec<&str> = keys
            .iter()
            .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(PodcastError::config(format!(
                "Missing API keys: {}. Set them in config.toml, as LOCALCAST_* variables or as {}.",
                missing.join(", "),
                LEGACY_KEY_VARS.join("/")
            ))
            .into())
        }
    }

    /// Parsed request timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.server.timezone.parse::<Tz>().map_err(|_| {
            PodcastError::config(format!("Unknown timezone '{}'", self.server.timezone)).into()
        })
    }

    #[must_use]
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.timeout_seconds.into())
    }

    #[must_use]
    pub fn narration_timeout(&self) -> Duration {
        Duration::from_secs(self.narration.timeout_seconds.into())
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds.into())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.timeout_seconds > 120 {
            return Err(PodcastError::config("Provider timeout cannot exceed 120 seconds").into());
        }

        if self.narration.timeout_seconds > 600 {
            return Err(PodcastError::config("Narration timeout cannot exceed 600 seconds").into());
        }

        let pipeline_budget = SEQUENTIAL_PROVIDER_CALLS * self.providers.timeout_seconds
            + self.narration.timeout_seconds;
        if self.server.request_timeout_seconds < pipeline_budget {
            return Err(PodcastError::config(format!(
                "Request timeout ({}s) must cover the provider and narration timeouts ({}s)",
                self.server.request_timeout_seconds, pipeline_budget
            ))
            .into());
        }

        if self.providers.places.result_limit > 50 || self.providers.landmarks.result_limit > 500 {
            return Err(PodcastError::config(
                "Result limits cannot exceed 50 (places) or 500 (landmarks)",
            )
            .into());
        }

        if !(10..=10_000).contains(&self.providers.landmarks.radius_meters) {
            return Err(PodcastError::config(
                "Landmark search radius must be between 10 and 10000 meters",
            )
            .into());
        }

        if !(0.0..=2.0).contains(&self.narration.temperature) {
            return Err(
                PodcastError::config("Narration temperature must be between 0 and 2").into(),
            );
        }

        if self.narration.max_tokens > 4096 {
            return Err(PodcastError::config("Narration max tokens cannot exceed 4096").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PodcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PodcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            ("weather", &self.providers.weather.base_url),
            ("geocoding", &self.providers.geocoding.base_url),
            ("news", &self.providers.news.base_url),
            ("places", &self.providers.places.base_url),
            ("landmarks", &self.providers.landmarks.base_url),
            ("narration", &self.narration.base_url),
            ("speech", &self.speech.base_url),
            ("telemetry", &self.telemetry.endpoint),
        ];
        for (name, url) in urls {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PodcastError::config(format!(
                    "The {name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        self.timezone()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_all_keys() -> PodcastConfig {
        let mut config = PodcastConfig::default();
        config.providers.weather.api_key = Some("weather_key".to_string());
        config.providers.geocoding.api_key = Some("geocoding_key".to_string());
        config.providers.news.api_key = Some("news_key".to_string());
        config.providers.places.api_key = Some("places_key".to_string());
        config.narration.api_key = Some("openai_key".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = PodcastConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.timezone, "Europe/London");
        assert_eq!(config.providers.timeout_seconds, 10);
        assert_eq!(config.providers.landmarks.radius_meters, 1200);
        assert_eq!(config.narration.model, "gpt-4");
        assert_eq!(config.narration.max_tokens, 600);
        assert_eq!(config.speech.language, "en");
        assert!(!config.telemetry.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_require_api_keys_lists_missing() {
        let config = PodcastConfig::default();
        let err = config.require_api_keys().unwrap_err().to_string();
        assert!(err.contains("providers.weather.api_key"));
        assert!(err.contains("narration.api_key"));

        assert!(with_all_keys().require_api_keys().is_ok());
    }

    #[test]
    fn test_legacy_keys_fill_only_unset_slots() {
        let mut config = PodcastConfig::default();
        config.providers.news.api_key = Some("structured".to_string());

        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENWEATHERMAP_API_KEY", "owm"),
            ("NEWS_API_KEY", "legacy_news"),
            ("OPENAI_API_KEY", ""),
        ]);
        config.apply_legacy_keys(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.providers.weather.api_key.as_deref(), Some("owm"));
        assert_eq!(config.providers.news.api_key.as_deref(), Some("structured"));
        assert!(config.narration.api_key.is_none());
        assert!(config.providers.places.api_key.is_none());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = with_all_keys();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = with_all_keys();
        config.providers.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_request_timeout_must_cover_pipeline() {
        let mut config = with_all_keys();
        let budget = config.narration_timeout() + 5 * config.provider_timeout();
        assert!(config.request_timeout() >= budget);

        config.server.request_timeout_seconds = 120;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must cover the provider and narration timeouts (140s)"));

        config.narration.timeout_seconds = 60;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_timezone() {
        let mut config = PodcastConfig::default();
        config.server.timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.validate().is_err());

        config.server.timezone = "America/New_York".to_string();
        assert_eq!(config.timezone().unwrap(), chrono_tz::America::New_York);
    }

    #[test]
    fn test_apply_defaults_fills_zeroes() {
        let mut config = PodcastConfig::default();
        config.providers.timeout_seconds = 0;
        config.narration.model = String::new();
        config.providers.fallback_city = "  ".to_string();
        config.apply_defaults();
        assert_eq!(config.providers.timeout_seconds, 10);
        assert_eq!(config.narration.model, "gpt-4");
        assert_eq!(config.providers.fallback_city, "the local area");
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("localcast-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8088\n\n[narration]\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();

        let config = PodcastConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.narration.model, "gpt-4o");
        assert_eq!(config.narration.max_tokens, 600);

        std::fs::remove_dir_all(dir).unwrap();
    }
}
