//! HTTP transport capability.
//!
//! # Responsibilities
//! - Execute one `OutboundRequest` with a per-call timeout
//! - Distinguish "no response" (`TransportError`) from "response received"
//! - Optionally reuse one client session across calls (keep-alive)
//!
//! # Design Decisions
//! - Status codes are NOT judged here; the dispatcher classifies them
//! - Without keep-alive every call gets an independent client with no idle pool
//! - The keep-alive session is built lazily on first use

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::error::TransportError;
use crate::http::request::{Body, OutboundRequest};
use crate::http::response::RawResponse;

/// Performs raw HTTP exchanges on behalf of the dispatcher.
pub trait Transport: Send + Sync {
    fn perform_request<'a>(
        &'a self,
        request: &'a OutboundRequest,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>>;
}

/// `reqwest`-backed transport.
#[derive(Debug)]
pub struct ReqwestTransport {
    keep_alive: bool,
    user_agent: Option<String>,
    session: Mutex<Option<reqwest::Client>>,
    sessions_created: AtomicUsize,
}

impl ReqwestTransport {
    pub fn new(keep_alive: bool) -> Self {
        Self {
            keep_alive,
            user_agent: None,
            session: Mutex::new(None),
            sessions_created: AtomicUsize::new(0),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Whether the shared keep-alive session has been created yet.
    pub fn has_session(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// How many keep-alive sessions have been built. At most one over the transport's life.
    pub fn sessions_created(&self) -> usize {
        self.sessions_created.load(Ordering::Relaxed)
    }

    fn client(&self) -> Result<reqwest::Client, TransportError> {
        if !self.keep_alive {
            return self.build_client(false);
        }

        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }
        let client = self.build_client(true)?;
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("created keep-alive HTTP session");
        *session = Some(client.clone());
        Ok(client)
    }

    fn build_client(&self, pooled: bool) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder();
        if !pooled {
            builder = builder.pool_max_idle_per_host(0);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        builder.build().map_err(TransportError::from)
    }

    async fn execute(
        &self,
        request: &OutboundRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let client = self.client()?;

        let mut builder = client
            .request(request.method.clone(), request.url.clone())
            .timeout(timeout);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.body {
            Some(Body::Json(value)) => builder.json(value),
            Some(Body::Form(fields)) => builder.form(fields),
            Some(Body::Raw(bytes)) => builder.body(bytes.clone()),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
            url,
        })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Transport for ReqwestTransport {
    fn perform_request<'a>(
        &'a self,
        request: &'a OutboundRequest,
        timeout: Duration,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        self.execute(request, timeout).boxed()
    }
}
