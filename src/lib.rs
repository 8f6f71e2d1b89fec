//! `hello-weather` - greets visitors with the weather where they are
//!
//! A visitor's IP is geolocated with ipinfo.io, the city's current
//! temperature is fetched from OpenWeatherMap, and both are folded into a
//! JSON greeting served at `GET /api/hello`.

pub mod api;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod greeting;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::{AppState, HelloQuery, HelloResponse};
pub use client_ip::ClientIpPolicy;
pub use crate::config::HelloConfig;
pub use error::HelloError;
pub use geolocation::IpInfoClient;
pub use weather::OpenWeatherClient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, HelloError>;
