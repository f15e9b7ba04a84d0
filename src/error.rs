// src/error.rs

//! Unified error handling for the news service.

use std::fmt;

use thiserror::Error;

/// Result type alias for news service operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Fetching a source page failed
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// A structured payload did not have the expected shape
    #[error("Unexpected {page} payload: {message}")]
    Payload { page: String, message: String },

    /// A required structural anchor was never found in a document
    #[error("Malformed {page} document: {anchor} not found")]
    MalformedDocument { page: String, anchor: String },

    /// Snapshot persistence failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Notification delivery failed
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a payload shape error for a page kind.
    pub fn payload(page: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Payload {
            page: page.into(),
            message: message.to_string(),
        }
    }

    /// Create a malformed document error.
    pub fn malformed(page: impl Into<String>, anchor: impl Into<String>) -> Self {
        Self::MalformedDocument {
            page: page.into(),
            anchor: anchor.into(),
        }
    }

    /// Create a persistence error.
    pub fn persistence(message: impl fmt::Display) -> Self {
        Self::Persistence(message.to_string())
    }

    /// Create a delivery error.
    pub fn delivery(message: impl fmt::Display) -> Self {
        Self::Delivery(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether the error means the source could not be fetched or understood.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Fetch { .. } | Self::Payload { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_failure_classification() {
        assert!(AppError::fetch("https://example.com", "timeout").is_fetch_failure());
        assert!(AppError::payload("version", "not an object").is_fetch_failure());
        assert!(!AppError::malformed("staff", "team-body").is_fetch_failure());
        assert!(!AppError::persistence("disk full").is_fetch_failure());
    }

    #[test]
    fn test_malformed_message() {
        let err = AppError::malformed("shop", "tab list");
        assert_eq!(err.to_string(), "Malformed shop document: tab list not found");
    }
}
