//! IP geolocation via ipinfo.io
//!
//! Maps a visitor's IP address to an approximate city name.

use reqwest::{Client, StatusCode};
use std::net::IpAddr;
use tracing::{debug, instrument};

use crate::models::IpInfoResponse;
use crate::{HelloError, Result};

const SERVICE: &str = "ipinfo";

/// ipinfo.io API client
#[derive(Debug, Clone)]
pub struct IpInfoClient {
    client: Client,
    base_url: String,
}

impl IpInfoClient {
    /// Create a client against `base_url` (normally `https://ipinfo.io`)
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Resolve `ip` to a city name.
    ///
    /// Anything short of a 200 response carrying a non-blank city is an
    /// error.
    #[instrument(name = "geolocate", skip(self))]
    pub async fn lookup_city(&self, ip: IpAddr) -> Result<String> {
        let url = format!("{}/{}/json", self.base_url, ip);
        debug!("Calling the geolocation API");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(HelloError::unexpected_status(SERVICE, status));
        }

        let info: IpInfoResponse = response.json().await?;
        let city = info
            .city()
            .ok_or_else(|| HelloError::api(format!("ipinfo returned no city for {ip}")))?;

        debug!(city, "Resolved city");
        Ok(city.to_string())
    }
}
