//! Error types and handling for the hello-weather service

use thiserror::Error;

/// Main error type for the hello-weather service
#[derive(Error, Debug)]
pub enum HelloError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Upstream API answered, but not with something usable
    #[error("API error: {message}")]
    Api { message: String },

    /// Upstream API answered with a status other than 200
    #[error("{service} returned HTTP {status}")]
    UnexpectedStatus { service: &'static str, status: u16 },

    /// Transport or body decoding failure from the HTTP client
    #[error("HTTP error: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl HelloError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create an error for a non-200 upstream response
    pub fn unexpected_status(service: &'static str, status: reqwest::StatusCode) -> Self {
        Self::UnexpectedStatus {
            service,
            status: status.as_u16(),
        }
    }
}
