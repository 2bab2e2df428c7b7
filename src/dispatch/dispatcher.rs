//! Single-call dispatcher.
//!
//! # Responsibilities
//! - Stamp the request ID and run the call through the transport
//! - Classify: transport failure or 5xx → failure, anything else → delivered
//! - Log timing on success, URL and truncated body on failure
//! - Fire the matching callback, then hand the outcome back to the caller
//!
//! # Design Decisions
//! - 4xx responses are delivered; the caller inspects the status code
//! - The dispatcher never touches the availability tracker; the façade does

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::dispatch::job::Callbacks;
use crate::error::DeliveryError;
use crate::http::{OutboundRequest, Response, Transport};
use crate::observability::metrics;
use crate::resilience::classify;

/// Bytes of a failed response body kept in the error log.
pub const LOGGED_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn perform_send(
        &self,
        mut request: OutboundRequest,
        callbacks: Callbacks,
    ) -> Result<Response, DeliveryError> {
        let request_id = request.ensure_request_id();
        let started = Instant::now();
        let outcome = self
            .transport
            .perform_request(&request, self.timeout)
            .await;
        let elapsed = started.elapsed();

        let result = match outcome {
            Ok(raw) => {
                let response = Response::from_raw(raw, elapsed);
                let code = response.status_code();
                if classify::is_server_error(code) {
                    Err(DeliveryError::Status {
                        code,
                        response: Box::new(response),
                    })
                } else {
                    Ok(response)
                }
            }
            Err(e) => Err(DeliveryError::Transport(e)),
        };

        match result {
            Ok(response) => {
                tracing::info!(
                    method = %request.method,
                    url = %request.url,
                    status = response.status_code(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    request_id = %request_id,
                    "send {} {:.3}ms",
                    request.url,
                    elapsed.as_secs_f64() * 1000.0
                );
                metrics::record_request("delivered", elapsed);
                callbacks.succeeded(&response);
                Ok(response)
            }
            Err(error) => {
                log_failure(&request, &request_id, &error);
                metrics::record_request(outcome_label(&error), elapsed);
                callbacks.failed(&error);
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn outcome_label(error: &DeliveryError) -> &'static str {
    match error {
        DeliveryError::Transport(_) => "transport_error",
        DeliveryError::Status { .. } => "server_error",
    }
}

fn log_failure(request: &OutboundRequest, request_id: &str, error: &DeliveryError) {
    match error {
        DeliveryError::Status { code, response } => {
            tracing::error!(
                method = %request.method,
                remote_url = %request.url,
                status = *code,
                body = %response.body_preview(LOGGED_BODY_LIMIT),
                request_id = %request_id,
                "Unable to reach proxy server: {error}"
            );
        }
        DeliveryError::Transport(cause) => {
            tracing::error!(
                method = %request.method,
                remote_url = %request.url,
                error = %cause,
                request_id = %request_id,
                "Unable to reach proxy server: {error}"
            );
        }
    }
    tracing::error!(remote_url = %request.url, "Failed to submit request");
}
