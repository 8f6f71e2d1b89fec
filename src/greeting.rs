//! Greeting text and the fallbacks used when upstream lookups fail

/// Name used when the visitor does not give one
pub const DEFAULT_VISITOR_NAME: &str = "Guest";

/// Location reported when geolocation fails
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Temperature (Celsius) reported when the weather lookup fails or is skipped
pub const DEFAULT_TEMPERATURE: f64 = 11.0;

/// The visitor's name as given, or [`DEFAULT_VISITOR_NAME`] when absent or blank
#[must_use]
pub fn visitor_name(raw: Option<&str>) -> &str {
    raw.filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_VISITOR_NAME)
}

#[must_use]
pub fn compose_greeting(visitor_name: &str, temperature: f64, location: &str) -> String {
    format!(
        "Hello, {visitor_name}! The temperature is {temperature:.1} degrees Celsius in {location}"
    )
}
