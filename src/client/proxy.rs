//! Proxy client façade.
//!
//! # Responsibilities
//! - Resolve endpoints against the base URI
//! - Gate every call on the availability tracker (fail fast, no I/O)
//! - Feed dispatch outcomes back into the tracker before user callbacks run
//! - Own the async worker for queued sends
//!
//! # Data Flow
//! ```text
//! send(req)        → prepare (resolve, gate) → ClientCore::deliver → Response
//! send_queued(req) → prepare (resolve, gate) → AsyncWorker::enqueue
//!                                               → ClientCore::deliver (later)
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::Method;
use tokio::runtime::Handle;
use tracing::Instrument;
use url::Url;

use crate::config::{validate_config, ClientConfig, ConfigError};
use crate::dispatch::{AsyncWorker, Callbacks, Dispatcher, DrainOutcome, JobHandler, PendingJob};
use crate::error::{DeliveryError, ProxyError, ProxyResult};
use crate::http::{Body, OutboundRequest, ReqwestTransport, Response, Transport};
use crate::observability::{metrics, Telemetry};
use crate::resilience::{classify, AvailabilitySnapshot, AvailabilityTracker};

/// State shared between direct sends and the worker task.
pub(crate) struct ClientCore {
    base: Url,
    tracker: Arc<AvailabilityTracker>,
    dispatcher: Dispatcher,
    telemetry: Telemetry,
}

impl ClientCore {
    async fn deliver(
        &self,
        request: OutboundRequest,
        callbacks: Callbacks,
    ) -> Result<Response, DeliveryError> {
        let on_delivered = Arc::clone(&self.tracker);
        let on_failed = Arc::clone(&self.tracker);
        let span = self.telemetry.span().clone();

        let callbacks = callbacks.preceded_by(
            move |_| {
                on_delivered.record_success();
                metrics::record_availability(true);
            },
            move |error| {
                if !classify::counts_against_availability(error) {
                    return;
                }
                on_failed.record_failure();
                metrics::record_availability(false);
                tracing::warn!(
                    parent: &span,
                    retry_count = on_failed.retry_count(),
                    retry_after_secs = on_failed.retry_after().map(|d| d.as_secs_f64()),
                    "proxy server marked as failing"
                );
            },
        );

        self.dispatcher
            .perform_send(request, callbacks)
            .instrument(self.telemetry.span().clone())
            .await
    }
}

impl JobHandler for ClientCore {
    fn handle(&self, job: PendingJob) -> BoxFuture<'_, Result<Response, DeliveryError>> {
        self.deliver(job.request, job.callbacks).boxed()
    }
}

/// One call through a [`ProxyClient`], relative to its base URI.
#[derive(Debug)]
pub struct SendRequest {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    callbacks: Callbacks,
}

impl SendRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            callbacks: Callbacks::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn json(self, value: serde_json::Value) -> Self {
        self.body(Body::Json(value))
    }

    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.body = Some(Body::Form(fields));
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Response) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_success(f);
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&DeliveryError) + Send + 'static,
    {
        self.callbacks = self.callbacks.on_failure(f);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Builder for a [`ProxyClient`] with a custom transport or telemetry span.
pub struct ProxyClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    telemetry: Option<Telemetry>,
}

impl ProxyClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn telemetry(mut self, telemetry: Telemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn build(self) -> ProxyResult<ProxyClient> {
        let config = self.config;
        validate_config(&config).map_err(ConfigError::Validation)?;

        let base = Url::parse(&config.base_uri).map_err(|source| ProxyError::InvalidEndpoint {
            endpoint: config.base_uri.clone(),
            source,
        })?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let mut transport = ReqwestTransport::new(config.keep_alive);
                if let Some(agent) = &config.user_agent {
                    transport = transport.with_user_agent(agent.clone());
                }
                Arc::new(transport)
            }
        };
        let telemetry = self
            .telemetry
            .unwrap_or_else(|| Telemetry::for_base_uri(&base));

        let core = Arc::new(ClientCore {
            base,
            tracker: Arc::new(AvailabilityTracker::new()),
            dispatcher: Dispatcher::new(transport, config.timeout()),
            telemetry: telemetry.clone(),
        });
        // The worker spawns on the build-time runtime, so any thread may enqueue.
        let mut worker = AsyncWorker::new(core.clone()).with_span(telemetry.span().clone());
        if let Ok(runtime) = Handle::try_current() {
            worker = worker.with_runtime(runtime);
        }

        Ok(ProxyClient {
            core,
            worker,
            shutdown_timeout: config.shutdown_timeout(),
        })
    }
}

/// HTTP client bound to one base URI, with fail-fast availability tracking.
pub struct ProxyClient {
    core: Arc<ClientCore>,
    worker: AsyncWorker,
    shutdown_timeout: Duration,
}

impl ProxyClient {
    /// Build a client using the reqwest transport.
    pub fn new(config: ClientConfig) -> ProxyResult<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: ClientConfig) -> ProxyClientBuilder {
        ProxyClientBuilder {
            config,
            transport: None,
            telemetry: None,
        }
    }

    pub fn base_uri(&self) -> &Url {
        &self.core.base
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.core.telemetry
    }

    pub fn timeout(&self) -> Duration {
        self.core.dispatcher.timeout()
    }

    /// Resolve `endpoint` against the base URI (`""` is the base itself).
    pub fn resolve(&self, endpoint: &str) -> ProxyResult<Url> {
        self.core
            .base
            .join(endpoint)
            .map_err(|source| ProxyError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                source,
            })
    }

    /// Perform the call now and wait for its outcome.
    pub async fn send(&self, request: SendRequest) -> ProxyResult<Response> {
        let (request, callbacks) = self.prepare(request)?;
        Ok(self.core.deliver(request, callbacks).await?)
    }

    /// Hand the call to the async worker and return immediately.
    ///
    /// The availability gate is checked now, not when the worker picks the job up.
    /// Outcomes reach the caller only through the request's callbacks.
    pub fn send_queued(&self, request: SendRequest) -> ProxyResult<()> {
        let (request, callbacks) = self.prepare(request)?;
        self.worker.enqueue(PendingJob::new(request, callbacks))
    }

    fn prepare(&self, request: SendRequest) -> ProxyResult<(OutboundRequest, Callbacks)> {
        let SendRequest {
            method,
            endpoint,
            query,
            headers,
            body,
            callbacks,
        } = request;
        let url = self.resolve(&endpoint)?;

        if !self.core.tracker.should_try() {
            let retry_after = self.core.tracker.retry_after();
            tracing::error!(
                parent: self.core.telemetry.span(),
                %url,
                retry_count = self.core.tracker.retry_count(),
                "Try later, client is inactive: {url}"
            );
            metrics::record_fail_fast();
            return Err(ProxyError::Unavailable { retry_after });
        }

        let mut outbound = OutboundRequest::new(method, url);
        outbound.query = query;
        outbound.headers = headers;
        outbound.body = body;
        Ok((outbound, callbacks))
    }

    pub fn availability(&self) -> AvailabilitySnapshot {
        self.core.tracker.snapshot()
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.core.tracker
    }

    pub fn is_failing(&self) -> bool {
        self.core.tracker.is_failing()
    }

    /// Start the worker ahead of the first queued send.
    pub fn start_worker(&self) -> ProxyResult<()> {
        self.worker.start()
    }

    pub fn worker(&self) -> &AsyncWorker {
        &self.worker
    }

    pub fn pending_jobs(&self) -> usize {
        self.worker.pending()
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Drain the worker using the configured shutdown timeout.
    pub async fn shutdown(&self) -> DrainOutcome {
        self.worker.shutdown(self.shutdown_timeout).await
    }

    pub async fn shutdown_within(&self, timeout: Duration) -> DrainOutcome {
        self.worker.shutdown(timeout).await
    }
}

impl std::fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyClient")
            .field("base_uri", &self.core.base.as_str())
            .field("availability", &self.availability())
            .field("worker", &self.worker)
            .finish()
    }
}
