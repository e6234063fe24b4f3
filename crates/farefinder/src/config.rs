//! Configuration management for farefinder.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "farefinder";

/// Environment variable prefix.
const ENV_PREFIX: &str = "FAREFINDER_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FAREFINDER_`)
/// 2. TOML config file at `~/.config/farefinder/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Flight data provider configuration.
    pub api: ApiConfig,
    /// Fixed flight search parameters.
    pub search: SearchConfig,
    /// Search form behaviour.
    pub form: FormConfig,
}

/// Flight data provider configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API key sent as `X-RapidAPI-Key`.
    pub key: Option<String>,
    /// Host identifier sent as `X-RapidAPI-Host`.
    pub host: String,
    /// Flight search endpoint.
    pub flights_url: String,
    /// Airport search endpoint.
    pub airports_url: String,
    /// Whole-request timeout in seconds.
    /// Set to 0 to wait indefinitely.
    pub request_timeout_secs: u64,
}

/// Fixed parameters sent with every flight search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Cabin class (`cabinClass`).
    pub cabin_class: String,
    /// Result ordering (`sortBy`).
    pub sort_by: String,
    /// Price currency (`currency`).
    pub currency: String,
    /// Market (`market`).
    pub market: String,
    /// Country code (`countryCode`).
    pub country_code: String,
    /// Locale for airport lookups (`locale`).
    pub locale: String,
}

/// Search form configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Quiet period before an airport query is sent, in milliseconds.
    pub debounce_ms: u64,
    /// Largest passenger count the form accepts.
    pub max_passengers: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            host: "sky-scrapper.p.rapidapi.com".to_string(),
            flights_url: "https://sky-scrapper.p.rapidapi.com/api/v1/flights/searchFlights"
                .to_string(),
            airports_url: "https://sky-scanner3.p.rapidapi.com/api/v1/flights/searchAirport"
                .to_string(),
            request_timeout_secs: 0,
        }
    }
}

const REDACTED: &str = "[REDACTED]";

// Hand-written so the key never reaches logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("key", &self.key.as_ref().map(|_| REDACTED))
            .field("host", &self.host)
            .field("flights_url", &self.flights_url)
            .field("airports_url", &self.airports_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cabin_class: "economy".to_string(),
            sort_by: "best".to_string(),
            currency: "USD".to_string(),
            market: "en-US".to_string(),
            country_code: "US".to_string(),
            locale: "en-US".to_string(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            max_passengers: 5,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `FAREFINDER_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "api.host must not be empty".to_string(),
            });
        }

        for (name, url) in [
            ("api.flights_url", &self.api.flights_url),
            ("api.airports_url", &self.api.airports_url),
        ] {
            if let Err(e) = reqwest::Url::parse(url) {
                return Err(Error::ConfigValidation {
                    message: format!("{name} is not a valid URL ({url}): {e}"),
                });
            }
        }

        if self.form.max_passengers == 0 {
            return Err(Error::ConfigValidation {
                message: "form.max_passengers must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Get the API key, if one is configured and non-blank.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.api
            .key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Get the request timeout as a Duration, `None` meaning no timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.api.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.api.request_timeout_secs))
        }
    }

    /// Get the airport lookup debounce window as a Duration.
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.form.debounce_ms)
    }

    /// A copy safe to display, with the API key masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut shown = self.clone();
        if shown.api.key.is_some() {
            shown.api.key = Some(REDACTED.to_string());
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.api.key.is_none());
        assert_eq!(config.api.host, "sky-scrapper.p.rapidapi.com");
        assert_eq!(config.form.debounce_ms, 500);
        assert_eq!(config.form.max_passengers, 5);
    }

    #[test]
    fn test_default_search_config() {
        let search = SearchConfig::default();

        assert_eq!(search.cabin_class, "economy");
        assert_eq!(search.sort_by, "best");
        assert_eq!(search.currency, "USD");
        assert_eq!(search.market, "en-US");
        assert_eq!(search.country_code, "US");
        assert_eq!(search.locale, "en-US");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.api.host = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api.host"));
    }

    #[test]
    fn test_validate_bad_url() {
        let mut config = Config::default();
        config.api.airports_url = "not a url".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("api.airports_url"));
    }

    #[test]
    fn test_validate_zero_passengers() {
        let mut config = Config::default();
        config.form.max_passengers = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_passengers"));
    }

    #[test]
    fn test_api_key_blank_is_none() {
        let mut config = Config::default();
        config.api.key = Some("   ".to_string());
        assert!(config.api_key().is_none());

        config.api.key = Some(" abc123 ".to_string());
        assert_eq!(config.api_key(), Some("abc123"));
    }

    #[test]
    fn test_api_config_debug_redacts_key() {
        let mut config = Config::default();
        config.api.key = Some("super-secret".to_string());

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_redacted_masks_key_only() {
        let mut config = Config::default();
        config.api.key = Some("secret".to_string());
        let shown = config.redacted();

        assert_eq!(shown.api.key.as_deref(), Some("[REDACTED]"));
        assert_eq!(shown.api.host, config.api.host);
        assert!(Config::default().redacted().api.key.is_none());
    }

    #[test]
    fn test_request_timeout() {
        let mut config = Config::default();
        assert!(config.request_timeout().is_none());

        config.api.request_timeout_secs = 20;
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(20)));
    }

    #[test]
    fn test_debounce() {
        assert_eq!(Config::default().debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("farefinder"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[search]\ncurrency = \"EUR\"\n\n[form]\nmax_passengers = 9\ndebounce_ms = 250"
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.search.currency, "EUR");
        assert_eq!(config.search.cabin_class, "economy");
        assert_eq!(config.form.max_passengers, 9);
        assert_eq!(config.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[form]\nmax_passengers = 0").unwrap();

        let result = Config::load_from(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    }

    #[test]
    fn test_search_config_serialize() {
        let json = serde_json::to_string(&SearchConfig::default()).unwrap();
        assert!(json.contains("cabin_class"));
    }

    #[test]
    fn test_form_config_deserialize_partial() {
        let form: FormConfig = serde_json::from_str(r#"{"debounce_ms": 100}"#).unwrap();
        assert_eq!(form.debounce_ms, 100);
        assert_eq!(form.max_passengers, 5);
    }
}
