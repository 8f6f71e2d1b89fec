//! Configuration management for the hello-weather service
//!
//! Settings come from an optional `config.toml` in the working directory,
//! overridden by plain (unprefixed) environment variables such as `PORT`
//! and `WEATHER_API_KEY`. The process loads `.env` into the environment
//! before any of this runs.

use crate::HelloError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the hello-weather service
#[derive(Clone, Serialize, Deserialize)]
pub struct HelloConfig {
    /// TCP port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// OpenWeatherMap API key
    #[serde(default)]
    pub weather_api_key: String,
    /// Base URL of the IP geolocation service
    #[serde(default = "default_ipinfo_base_url")]
    pub ipinfo_base_url: String,
    /// Base URL of the weather service
    #[serde(default = "default_openweather_base_url")]
    pub openweather_base_url: String,
    /// Timeout for each outbound request in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    /// Public IP looked up in place of a loopback caller
    #[serde(default = "default_loopback_fallback_ip")]
    pub loopback_fallback_ip: String,
    /// Honour `X-Forwarded-For` / `X-Real-IP` from a reverse proxy
    #[serde(default)]
    pub trust_proxy_headers: bool,
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

// Default value functions
fn default_port() -> u16 {
    3000
}

fn default_ipinfo_base_url() -> String {
    "https://ipinfo.io".to_string()
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_loopback_fallback_ip() -> String {
    "8.8.8.8".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for HelloConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            weather_api_key: String::new(),
            ipinfo_base_url: default_ipinfo_base_url(),
            openweather_base_url: default_openweather_base_url(),
            http_timeout_seconds: default_http_timeout(),
            loopback_fallback_ip: default_loopback_fallback_ip(),
            trust_proxy_headers: false,
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

// The API key stays out of Debug output so it never reaches the logs.
impl std::fmt::Debug for HelloConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelloConfig")
            .field("port", &self.port)
            .field("weather_api_key", &"<redacted>")
            .field("ipinfo_base_url", &self.ipinfo_base_url)
            .field("openweather_base_url", &self.openweather_base_url)
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("loopback_fallback_ip", &self.loopback_fallback_ip)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl HelloConfig {
    /// Load configuration from `config.toml` and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(Some(PathBuf::from("config.toml")), None)
    }

    /// Load configuration from an optional file and an environment source.
    ///
    /// `env` replaces the process environment when given, which keeps tests
    /// away from global state.
    pub fn load_from(
        config_path: Option<PathBuf>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(config_file) = config_path.filter(|path| path.exists()) {
            builder = builder.add_source(
                File::from(config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Values stay strings here; numeric-looking API keys must not be
        // coerced into floats.
        builder = builder.add_source(
            Environment::default()
                .ignore_empty(true)
                .source(env),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: HelloConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to blank configuration fields
    pub fn apply_defaults(&mut self) {
        if self.port == 0 {
            self.port = default_port();
        }
        if self.ipinfo_base_url.is_empty() {
            self.ipinfo_base_url = default_ipinfo_base_url();
        }
        if self.openweather_base_url.is_empty() {
            self.openweather_base_url = default_openweather_base_url();
        }
        if self.http_timeout_seconds == 0 {
            self.http_timeout_seconds = default_http_timeout();
        }
        if self.loopback_fallback_ip.is_empty() {
            self.loopback_fallback_ip = default_loopback_fallback_ip();
        }
        if self.log_level.is_empty() {
            self.log_level = default_log_level();
        }
        if self.log_format.is_empty() {
            self.log_format = default_log_format();
        }
        self.ipinfo_base_url = self.ipinfo_base_url.trim_end_matches('/').to_string();
        self.openweather_base_url = self.openweather_base_url.trim_end_matches('/').to_string();
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.fallback_ip()?;
        Ok(())
    }

    /// The weather API key is the only setting without a usable default
    pub fn validate_api_key(&self) -> Result<()> {
        if self.weather_api_key.trim().is_empty() {
            return Err(HelloError::config(
                "WEATHER_API_KEY is not set. Add it to your .env file or environment.",
            )
            .into());
        }
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.http_timeout_seconds > 120 {
            return Err(HelloError::config("HTTP timeout cannot exceed 120 seconds").into());
        }
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.log_level.as_str()) {
            return Err(HelloError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.log_level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.log_format.as_str()) {
            return Err(HelloError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.log_format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("ipinfo_base_url", &self.ipinfo_base_url),
            ("openweather_base_url", &self.openweather_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(HelloError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }

    /// The parsed public IP substituted for loopback callers
    pub fn fallback_ip(&self) -> Result<IpAddr> {
        let ip: IpAddr = self.loopback_fallback_ip.parse().map_err(|_| {
            HelloError::config(format!(
                "loopback_fallback_ip '{}' is not an IP address",
                self.loopback_fallback_ip
            ))
        })?;
        if ip.is_loopback() {
            return Err(HelloError::config("loopback_fallback_ip must not be a loopback address").into());
        }
        Ok(ip)
    }

    /// Outbound request timeout
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = HelloConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.ipinfo_base_url, "https://ipinfo.io");
        assert_eq!(config.openweather_base_url, "https://api.openweathermap.org");
        assert_eq!(config.loopback_fallback_ip, "8.8.8.8");
        assert!(!config.trust_proxy_headers);
        assert!(config.weather_api_key.is_empty());
    }

    #[test]
    fn test_load_reads_plain_env_vars() {
        let config = HelloConfig::load_from(
            None,
            env(&[("PORT", "8080"), ("WEATHER_API_KEY", "abc123")]),
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.weather_api_key, "abc123");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_load_defaults_port_to_3000() {
        let config = HelloConfig::load_from(None, env(&[("WEATHER_API_KEY", "abc123")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = HelloConfig::load_from(None, env(&[("PORT", "3000")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("WEATHER_API_KEY"));
    }

    #[test]
    fn test_empty_api_key_is_fatal() {
        let result = HelloConfig::load_from(None, env(&[("WEATHER_API_KEY", "")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed_from_base_urls() {
        let config = HelloConfig::load_from(
            None,
            env(&[
                ("WEATHER_API_KEY", "abc123"),
                ("IPINFO_BASE_URL", "http://localhost:9000/"),
            ]),
        )
        .unwrap();
        assert_eq!(config.ipinfo_base_url, "http://localhost:9000");
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = HelloConfig::default();
        config.weather_api_key = "abc123".to_string();
        config.log_level = "loud".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_timeout_range() {
        let mut config = HelloConfig::default();
        config.weather_api_key = "abc123".to_string();
        config.http_timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_loopback_fallback_ip_rejected() {
        let mut config = HelloConfig::default();
        config.weather_api_key = "abc123".to_string();
        config.loopback_fallback_ip = "127.0.0.1".to_string();
        assert!(config.validate().is_err());

        config.loopback_fallback_ip = "not-an-ip".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_output_redacts_api_key() {
        let mut config = HelloConfig::default();
        config.weather_api_key = "super-secret-key".to_string();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret-key"));
        assert!(printed.contains("<redacted>"));
    }
}
