//! Completed HTTP exchange.
//!
//! # Responsibilities
//! - Expose status, headers, raw body, final URL and elapsed time
//! - Decode JSON lazily, only when the content type says JSON and the body is non-empty
//! - Answer `has_data()` from `Content-Length`, falling back to the body length

use std::borrow::Cow;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

/// What the transport hands back before the dispatcher classifies it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub url: Url,
}

/// Body interpreted according to its content type.
#[derive(Debug, PartialEq)]
pub enum Payload<'a> {
    Empty,
    Json(&'a serde_json::Value),
    Raw(&'a [u8]),
}

#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    url: Url,
    elapsed: Duration,
    json: OnceLock<Option<serde_json::Value>>,
}

impl Response {
    pub fn from_raw(raw: RawResponse, elapsed: Duration) -> Self {
        Self {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            url: raw.url,
            elapsed,
            json: OnceLock::new(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` if absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn has_data(&self) -> bool {
        match self
            .header(CONTENT_LENGTH.as_str())
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            Some(length) => length > 0,
            None => !self.body.is_empty(),
        }
    }

    pub fn is_json(&self) -> bool {
        self.header(CONTENT_TYPE.as_str())
            .map(|v| v.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false)
    }

    /// Decoded JSON body, computed on first access.
    ///
    /// `None` when the response is not JSON, has no data, or fails to parse.
    pub fn json_value(&self) -> Option<&serde_json::Value> {
        self.json
            .get_or_init(|| {
                if !self.is_json() || !self.has_data() {
                    return None;
                }
                serde_json::from_slice(&self.body).ok()
            })
            .as_ref()
    }

    /// Deserialize the body into `T` regardless of content type.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn data(&self) -> Payload<'_> {
        if !self.has_data() {
            return Payload::Empty;
        }
        match self.json_value() {
            Some(value) => Payload::Json(value),
            None => Payload::Raw(&self.body),
        }
    }

    /// Body text cut to at most `limit` bytes, for log lines.
    pub fn body_preview(&self, limit: usize) -> String {
        let end = self.body.len().min(limit);
        String::from_utf8_lossy(&self.body[..end]).into_owned()
    }
}
