use std::net::SocketAddr;

use axum::{
    Router,
    extract::{ConnectInfo, Query, State, rejection::QueryRejection},
    http::HeaderMap,
    response::Json,
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    client_ip::ClientIpPolicy,
    config::HelloConfig,
    geolocation::IpInfoClient,
    greeting::{self, DEFAULT_TEMPERATURE, UNKNOWN_LOCATION},
    weather::OpenWeatherClient,
};

/// Shared, read-only state handed to every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub geolocation: IpInfoClient,
    pub weather: OpenWeatherClient,
    pub client_ip: ClientIpPolicy,
}

impl AppState {
    /// Build the upstream clients from configuration
    pub fn from_config(config: &HelloConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(concat!("hello-weather/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            geolocation: IpInfoClient::new(http.clone(), config.ipinfo_base_url.clone()),
            weather: OpenWeatherClient::new(
                http,
                config.openweather_base_url.clone(),
                config.weather_api_key.clone(),
            ),
            client_ip: ClientIpPolicy {
                loopback_fallback: config.fallback_ip()?,
                trust_proxy_headers: config.trust_proxy_headers,
            },
        })
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct HelloQuery {
    pub visitor_name: Option<String>,
}

impl HelloQuery {
    /// Build from raw query pairs; a repeated `visitor_name` keeps its first value.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let visitor_name = pairs
            .into_iter()
            .find(|(key, _)| key == "visitor_name")
            .map(|(_, value)| value);
        Self { visitor_name }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HelloResponse {
    pub client_ip: String,
    pub location: String,
    pub greeting: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(hello))
        .with_state(state)
}

#[instrument(skip_all, fields(peer = %peer))]
async fn hello(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Json<HelloResponse> {
    let query = query
        .map(|Query(pairs)| HelloQuery::from_pairs(pairs))
        .unwrap_or_else(|rejection| {
            warn!("Ignoring malformed query string: {}", rejection);
            HelloQuery::default()
        });
    let visitor = greeting::visitor_name(query.visitor_name.as_deref());

    let client_ip = state.client_ip.resolve(peer, &headers);

    // Weather is only worth asking about once we know where the visitor is.
    let (location, temperature) = match state.geolocation.lookup_city(client_ip).await {
        Ok(city) => {
            let temperature = match state.weather.current_temperature(&city).await {
                Ok(temperature) => temperature,
                Err(e) => {
                    warn!("Weather lookup for {} failed: {}", city, e);
                    DEFAULT_TEMPERATURE
                }
            };
            (city, temperature)
        }
        Err(e) => {
            warn!("Geolocation of {} failed: {}", client_ip, e);
            (UNKNOWN_LOCATION.to_string(), DEFAULT_TEMPERATURE)
        }
    };

    info!(%client_ip, location = %location, temperature, "Greeting visitor");

    Json(HelloResponse {
        client_ip: client_ip.to_string(),
        greeting: greeting::compose_greeting(visitor, temperature, &location),
        location,
    })
}
