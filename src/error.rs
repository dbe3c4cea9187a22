//! Error types for game-scrape
//!
//! Failures below the page level (single fetch attempts, single missing
//! fields) never show up here — they are absorbed by retries and field
//! defaults. This enum covers the failures that either kill a whole page
//! (extraction) or the whole run (configuration, probe, output file).

use thiserror::Error;

/// Result type alias for game-scrape operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for game-scrape
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "start")
        key: Option<String>,
    },

    /// I/O error (output file creation, writes, flush)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error from the HTTP transport
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A page URL could not be constructed
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// End-index discovery via the probe page failed
    #[error("probe failed: {0}")]
    Probe(String),

    /// A whole page could not be extracted (unparseable body, misaligned layout)
    #[error("extraction failed: {0}")]
    Extract(String),

    /// The output sink's writer task went away before a write completed
    #[error("output sink closed before write completed")]
    SinkClosed,
}

impl Error {
    /// Build a configuration error for a specific key.
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
