//! Callbacks and queued jobs.

use std::fmt;

use crate::error::DeliveryError;
use crate::http::{OutboundRequest, Response};

pub type SuccessCallback = Box<dyn FnOnce(&Response) + Send + 'static>;
pub type FailureCallback = Box<dyn FnOnce(&DeliveryError) + Send + 'static>;

/// Outcome hooks for one call. Exactly one of them fires, at most once.
#[derive(Default)]
pub struct Callbacks {
    on_success: Option<SuccessCallback>,
    on_failure: Option<FailureCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Response) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&DeliveryError) + Send + 'static,
    {
        self.on_failure = Some(Box::new(f));
        self
    }

    /// Run `success` / `failure` ahead of whatever hooks are already set.
    pub(crate) fn preceded_by<S, F>(self, success: S, failure: F) -> Self
    where
        S: FnOnce(&Response) + Send + 'static,
        F: FnOnce(&DeliveryError) + Send + 'static,
    {
        let Callbacks {
            on_success,
            on_failure,
        } = self;
        Callbacks {
            on_success: Some(Box::new(move |response: &Response| {
                success(response);
                if let Some(cb) = on_success {
                    cb(response);
                }
            })),
            on_failure: Some(Box::new(move |error: &DeliveryError| {
                failure(error);
                if let Some(cb) = on_failure {
                    cb(error);
                }
            })),
        }
    }

    pub(crate) fn succeeded(self, response: &Response) {
        if let Some(cb) = self.on_success {
            cb(response);
        }
    }

    pub(crate) fn failed(self, error: &DeliveryError) {
        if let Some(cb) = self.on_failure {
            cb(error);
        }
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// A send deferred to the async worker. Executed at most once, never retried.
#[derive(Debug)]
pub struct PendingJob {
    pub request: OutboundRequest,
    pub callbacks: Callbacks,
}

impl PendingJob {
    pub fn new(request: OutboundRequest, callbacks: Callbacks) -> Self {
        Self { request, callbacks }
    }
}
