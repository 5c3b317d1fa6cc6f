use std::path::PathBuf;

use thiserror::Error;

/// Why a raw `message` string could not be read as an OCPP-J array.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Message is not a JSON array")]
    NotAnArray,

    #[error("Expected 3 or 4 array elements, got {0}")]
    WrongLength(usize),
}

/// Problems with an inbound webhook event that are reported but never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error("Missing required field `{field}` on `{event}` event")]
    MissingRequiredField { field: &'static str, event: String },
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write log block: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(String),
}
