use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variables that override secrets from the config file
pub const ENV_WEATHER_API_KEY: &str = "AGRI_WEATHER_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "AGRI_GEMINI_API_KEY";
pub const ENV_GOOGLE_API_KEY: &str = "AGRI_GOOGLE_API_KEY";
pub const ENV_GOOGLE_SEARCH_ENGINE_ID: &str = "AGRI_GOOGLE_SEARCH_ENGINE_ID";

/// Configuration validation errors
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

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
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
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// NASA POWER satellite settings
    #[serde(default)]
    pub satellite: SatelliteConfig,

    /// Fixed device location (no desktop geolocation backend)
    #[serde(default)]
    pub location: LocationConfig,

    /// Generative AI settings
    #[serde(default)]
    pub ai: AiConfig,

    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Local storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the weather API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Place name used when no location is known
    #[serde(default = "default_city")]
    pub default_city: String,

    /// Refresh interval in minutes
    #[serde(default = "default_weather_refresh")]
    pub refresh_minutes: u32,
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_city() -> String {
    "London".to_string()
}

fn default_weather_refresh() -> u32 {
    5
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            default_city: default_city(),
            refresh_minutes: default_weather_refresh(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SatelliteConfig {
    /// Whether the dashboard queries NASA POWER at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_satellite_base_url")]
    pub base_url: String,

    /// Refresh interval in minutes (default: 15)
    #[serde(default = "default_satellite_refresh")]
    pub refresh_minutes: u32,
}

fn default_true() -> bool {
    true
}

fn default_satellite_base_url() -> String {
    "https://power.larc.nasa.gov".to_string()
}

fn default_satellite_refresh() -> u32 {
    15
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: default_satellite_base_url(),
            refresh_minutes: default_satellite_refresh(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Reported accuracy in meters for the fixed position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
}

impl LocationConfig {
    /// Both coordinates set
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_ai_model(),
            base_url: default_ai_base_url(),
        }
    }
}

impl AiConfig {
    pub fn is_configured(&self) -> bool {
        is_real_secret(&self.api_key)
    }
}

/// Google Custom Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_google_api_key")]
    pub api_key: String,

    #[serde(default = "default_search_engine_id")]
    pub engine_id: String,

    #[serde(default = "default_search_base_url")]
    pub base_url: String,
}

fn default_google_api_key() -> String {
    "your_google_api_key_here".to_string()
}

fn default_search_engine_id() -> String {
    "your_search_engine_id_here".to_string()
}

fn default_search_base_url() -> String {
    "https://www.googleapis.com".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: default_google_api_key(),
            engine_id: default_search_engine_id(),
            base_url: default_search_base_url(),
        }
    }
}

impl SearchConfig {
    /// Check if credentials are configured (not placeholders)
    pub fn is_configured(&self) -> bool {
        is_real_secret(&self.api_key) && is_real_secret(&self.engine_id)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the scan history (defaults to the platform data dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("agrigenius")
        })
    }
}

/// Empty values and `your_..._here` placeholders don't count as secrets.
fn is_real_secret(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !(value.starts_with("your_") && value.ends_with("_here"))
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agrigenius");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            satellite: SatelliteConfig::default(),
            location: LocationConfig::default(),
            ai: AiConfig::default(),
            search: SearchConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults there if missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let mut config = Self::default();
            if let Some(parent) = config_path.parent() {
                config.config_dir = parent.to_path_buf();
            }
            config.save_to(config_path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Overlay secrets from the environment; `lookup` is `std::env::var` outside tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |target: &mut String, name: &str| {
            if let Some(value) = lookup(name).filter(|v| !v.trim().is_empty()) {
                tracing::debug!("Using {} from environment", name);
                *target = value;
            }
        };

        set(&mut self.weather.api_key, ENV_WEATHER_API_KEY);
        set(&mut self.ai.api_key, ENV_GEMINI_API_KEY);
        set(&mut self.search.api_key, ENV_GOOGLE_API_KEY);
        set(&mut self.search.engine_id, ENV_GOOGLE_SEARCH_ENGINE_ID);
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.satellite.base_url, "satellite.base_url", &mut result);
        self.validate_url(&self.ai.base_url, "ai.base_url", &mut result);
        self.validate_url(&self.search.base_url, "search.base_url", &mut result);

        if self.weather.default_city.trim().is_empty() {
            result.add_error("weather.default_city", "Default city cannot be empty");
        }

        if self.weather.refresh_minutes == 0 {
            result.add_error(
                "weather.refresh_minutes",
                "Weather refresh interval must be greater than 0",
            );
        } else if self.weather.refresh_minutes > 1440 {
            result.add_warning(
                "weather.refresh_minutes",
                "Weather refresh interval is more than 24 hours",
            );
        }

        if self.satellite.enabled && self.satellite.refresh_minutes == 0 {
            result.add_error(
                "satellite.refresh_minutes",
                "Satellite refresh interval must be greater than 0",
            );
        }

        match (self.location.latitude, self.location.longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error("location.latitude", "Latitude must be within -90..=90");
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error("location.longitude", "Longitude must be within -180..=180");
                }
            }
            (None, None) => {}
            _ => result.add_warning(
                "location",
                "Only one coordinate set - location will be treated as unknown",
            ),
        }

        if !is_real_secret(&self.weather.api_key) {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - default weather values will be shown",
            );
        }

        if !self.ai.is_configured() {
            result.add_warning(
                "ai.api_key",
                "Gemini API key not configured - AI features will be unavailable",
            );
        }

        if self.ai.model.trim().is_empty() {
            result.add_error("ai.model", "Model name cannot be empty");
        }

        if !self.search.is_configured() {
            result.add_warning(
                "search",
                "Google search not configured - search will return no results",
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

                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("agrigenius");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_default_refresh_intervals() {
        let config = Config::default();
        assert_eq!(config.weather.refresh_minutes, 5);
        assert_eq!(config.satellite.refresh_minutes, 15);
        assert_eq!(config.weather.default_city, "London");
    }

    #[test]
    fn test_invalid_url() {
        let mut config = Config::default();
        config.weather.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.base_url"));
    }

    #[test]
    fn test_invalid_url_scheme() {
        let mut config = Config::default();
        config.ai.base_url = "ftp://localhost:8080".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_zero_refresh_is_error() {
        let mut config = Config::default();
        config.weather.refresh_minutes = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "weather.refresh_minutes"));
    }

    #[test]
    fn test_out_of_range_latitude() {
        let mut config = Config::default();
        config.location.latitude = Some(123.0);
        config.location.longitude = Some(10.0);
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "location.latitude"));
    }

    #[test]
    fn test_search_placeholders_are_warning() {
        let config = Config::default();
        assert!(!config.search.is_configured());
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "search"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|name| match name {
            ENV_GEMINI_API_KEY => Some("gem-key".to_string()),
            ENV_GOOGLE_API_KEY => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.ai.api_key, "gem-key");
        assert!(config.ai.is_configured());
        // Blank values are ignored
        assert_eq!(config.search.api_key, "your_google_api_key_here");
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_dir, dir.path());

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.ai.model, "gemini-2.5-flash");
        assert!(reloaded.location.coordinates().is_none());
    }

    #[test]
    fn test_load_from_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "config_dir = \"/tmp/agri\"\n\n[location]\nlatitude = 12.5\nlongitude = 77.25\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.location.coordinates(), Some((12.5, 77.25)));
        assert_eq!(config.weather.refresh_minutes, 5);
        assert_eq!(config.search.base_url, "https://www.googleapis.com");
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
}
