//! Outbound request description.
//!
//! # Responsibilities
//! - Describe one HTTP call as plain data (method, absolute URL, query, headers, body)
//! - Attach a unique request ID before the call leaves the process
//!
//! # Design Decisions
//! - The URL is already resolved against the client's base URI here
//! - A caller-supplied `x-request-id` is preserved, never overwritten

use reqwest::Method;
use url::Url;
use uuid::Uuid;

/// Header carrying the per-call correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Serialized as `application/json`.
    Json(serde_json::Value),
    /// Serialized as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Sent verbatim.
    Raw(Vec<u8>),
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Raw(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Raw(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Raw(text.as_bytes().to_vec())
    }
}

/// A fully resolved HTTP call, ready for a [`Transport`](crate::http::Transport).
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Return the request ID, generating one if the caller did not set it.
    pub fn ensure_request_id(&mut self) -> String {
        if let Some(existing) = self.header(X_REQUEST_ID) {
            return existing.to_string();
        }
        let id = Uuid::new_v4().to_string();
        self.headers.push((X_REQUEST_ID.to_string(), id.clone()));
        id
    }
}
