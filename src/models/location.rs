//! Geolocation payload returned by ipinfo.io

use serde::Deserialize;

/// Body of `GET https://ipinfo.io/{ip}/json`.
///
/// Bogon and reserved addresses come back without a city, so it is
/// optional here and checked by the caller.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct IpInfoResponse {
    #[serde(default)]
    pub city: Option<String>,
}

impl IpInfoResponse {
    /// The city name, if ipinfo reported a non-blank one
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}
