// src/error.rs
// =============================================================================
// Error kinds for the library half of linkgate.
//
// None of these are fatal to the host page:
// - MediationError: a link could not be parsed or a token could not be decoded
// - StatusError: the status snapshot could not be fetched, decoded, or cached
// - ConfigError: the configuration file is unreadable or invalid
//
// The binary (main.rs) wraps everything in anyhow::Error, the same way the
// rest of the application code does.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediationError {
    /// The URL looked like http(s) but has no parsable host
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },

    /// The `u` parameter is not URL-safe base64
    #[error("invalid redirect token: {0}")]
    InvalidToken(#[from] base64::DecodeError),

    /// The token decoded to bytes that are not UTF-8
    #[error("redirect token does not decode to UTF-8 text")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum StatusError {
    /// Transport error or a non-2xx response
    #[error("{0}")]
    Fetch(String),

    /// Response body was not the expected JSON document
    #[error("failed to decode status data: {0}")]
    Decode(String),

    /// Persisted envelope could not be read or parsed
    #[error("error reading cache: {0}")]
    CacheRead(String),

    /// Persisted envelope could not be written
    #[error("error saving cache: {0}")]
    CacheWrite(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
