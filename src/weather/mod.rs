//! Current temperature via OpenWeatherMap

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use crate::models::CurrentWeatherResponse;
use crate::{HelloError, Result};

const SERVICE: &str = "openweathermap";

/// OpenWeatherMap current-weather client
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenWeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenWeatherClient {
    /// Create a client against `base_url` (normally `https://api.openweathermap.org`)
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn url_for(&self, city: &str) -> String {
        format!(
            "{}/data/2.5/weather?q={}&units=metric&appid={}",
            self.base_url,
            urlencoding::encode(city),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Current temperature in degrees Celsius for `city`
    #[instrument(name = "current_temperature", skip(self))]
    pub async fn current_temperature(&self, city: &str) -> Result<f64> {
        debug!("Calling the weather API");

        // Request errors are stripped of their URL, it carries the API key.
        let response = self
            .client
            .get(self.url_for(city))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HelloError::unexpected_status(SERVICE, status));
        }

        let weather: CurrentWeatherResponse = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        debug!(temperature = weather.main.temp, "Received temperature");
        Ok(weather.main.temp)
    }
}
