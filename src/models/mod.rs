//! Data models for the hello-weather service
//!
//! Wire shapes of the two upstream services, organized by concern:
//! - Location: ipinfo.io geolocation payload
//! - Weather: OpenWeatherMap current-conditions payload

pub mod location;
pub mod weather;

pub use location::IpInfoResponse;
pub use weather::{CurrentWeatherResponse, MainReadings};
