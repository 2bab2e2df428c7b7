//! Error types for the proxy client.
//!
//! # Layers
//! ```text
//! TransportError  no response was received (connect, DNS, timeout)
//! DeliveryError   one dispatched call failed: transport failure or 5xx response
//! ProxyError      what the client façade returns to application code
//! ```

use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::Response;

/// Failure before any response was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The per-call timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Connection refused, reset, or name resolution failed.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The request could not be built (bad header, bad URL for the transport).
    #[error("invalid request: {0}")]
    Request(String),

    /// Anything else the transport reported, including body read failures.
    #[error("transport failure: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Failure of a single dispatched call.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response arrived but its status marks the server as failing.
    #[error("server responded with HTTP {code}")]
    Status { code: u16, response: Box<Response> },
}

impl DeliveryError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DeliveryError::Status { code, .. } => Some(*code),
            DeliveryError::Transport(_) => None,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            DeliveryError::Status { response, .. } => Some(response),
            DeliveryError::Transport(_) => None,
        }
    }
}

/// Errors surfaced by [`ProxyClient`](crate::ProxyClient) and [`RestClient`](crate::RestClient).
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The availability tracker is inside its backoff window; nothing was sent.
    #[error("proxy server unavailable, try again later")]
    Unavailable { retry_after: Option<Duration> },

    /// A queued send was attempted after worker shutdown began.
    #[error("async worker is stopped")]
    WorkerStopped,

    /// The async worker needs a Tokio runtime to start.
    #[error("no Tokio runtime available to start the async worker")]
    NoRuntime,

    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

impl ProxyError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ProxyError::Unavailable { .. })
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
