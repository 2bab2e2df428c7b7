//! Configuration schema definitions.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_TIMEOUT_SECS: f64 = 1.0;
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: f64 = 10.0;

/// Root configuration for a proxy client.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URI every endpoint is resolved against (e.g., "http://svc/api/").
    pub base_uri: String,

    /// Per-call timeout in seconds, enforced by the transport.
    pub timeout_secs: f64,

    /// Reuse one HTTP session for all calls.
    pub keep_alive: bool,

    /// How long worker shutdown waits for queued jobs to drain, in seconds.
    pub shutdown_timeout_secs: f64,

    /// Optional `User-Agent` header for every call.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://localhost:8080/".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            keep_alive: false,
            shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout_secs = timeout.as_secs_f64();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS))
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.shutdown_timeout_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_SHUTDOWN_TIMEOUT_SECS))
    }
}
