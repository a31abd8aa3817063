//! Error types for configuration loading, transport and delivery.

use thiserror::Error;

/// Reasons a single `notify` call did not result in a delivered message.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Blynk delivery is disabled")]
    Disabled,

    #[error("Invalid REST API url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("failure parsing JSON trigger reason '{payload}': {source}")]
    TriggerParse {
        payload: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("trigger reason '{payload}' has no string 'reason' field")]
    MissingReason { payload: String },

    #[error("Failed to send notification via Blynk REST API, URL '{url}', error '{source}'")]
    Transport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to send notification via Blynk REST API, URL '{url}', httpCode {status}")]
    UnexpectedStatus { url: String, status: u16 },
}

/// Failures of the outbound HTTP call, kept distinct for logging.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connect timeout")]
    ConnectTimeout,

    #[error("response timeout")]
    ResponseTimeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Errors building a configuration category from JSON.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Invalid configuration category: {0}")]
    InvalidCategory(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, DeliveryError>;
