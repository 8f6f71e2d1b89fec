//! Current-conditions payload returned by OpenWeatherMap

use serde::Deserialize;

/// Body of `GET /data/2.5/weather`; only `main.temp` is read
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CurrentWeatherResponse {
    pub main: MainReadings,
}

/// Main readings block, in the units requested (metric: Celsius)
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MainReadings {
    pub temp: f64,
}
