//! Error types for Uptime Seeker

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Uptime Seeker
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host entry failed validation
    #[error("Invalid host [{host}]: {reason}")]
    InvalidHost { host: String, reason: String },

    /// Header name or value is not valid HTTP
    #[error("Invalid header [{name}] for host [{host}]")]
    InvalidHeader { host: String, name: String },

    /// The same header is configured twice for one host
    #[error("Header [{name}] is configured more than once for host [{host}]")]
    DuplicateHeader { host: String, name: String },

    /// Nothing left to check after resolution
    #[error("No hosts to check")]
    NoHosts,

    // =========================================================================
    // Seeker Construction Errors
    // =========================================================================
    /// Metric registration failed (usually a duplicate host label)
    #[error("Failed to register metric for host [{host}]: {source}")]
    MetricRegistration {
        host: String,
        #[source]
        source: prometheus::Error,
    },

    /// HTTP client could not be built
    #[error("Failed to build HTTP client for host [{host}]: {source}")]
    HttpClient {
        host: String,
        #[source]
        source: reqwest::Error,
    },

    // =========================================================================
    // Exposition Errors
    // =========================================================================
    /// Metrics endpoint could not bind its listening address
    #[error("Failed to bind metrics server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
