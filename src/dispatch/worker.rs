//! Background worker for queued sends.
//!
//! # States
//! ```text
//! Idle → Running: start() or first enqueue()
//! Running → Stopped: shutdown()
//! Idle → Stopped: shutdown() before any job
//! ```
//!
//! # Design Decisions
//! - One Tokio task, one unbounded FIFO channel: jobs never overlap
//! - Enqueue is a channel send; the lifecycle lock is only taken to start or stop
//! - A failing or panicking job is logged and the loop moves on
//! - Shutdown sends a stop sentinel behind every queued job, then closes the channel
//!   so racing enqueues either land before the drain finishes or are rejected

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

use crate::dispatch::job::PendingJob;
use crate::error::{DeliveryError, ProxyError, ProxyResult};
use crate::http::Response;
use crate::observability::metrics;

/// Executes one dequeued job.
pub trait JobHandler: Send + Sync + 'static {
    fn handle(&self, job: PendingJob) -> BoxFuture<'_, Result<Response, DeliveryError>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Stopped,
}

/// How a shutdown call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    /// The worker processed every queued job and exited.
    Drained,
    /// The timeout elapsed first; `pending` jobs had not finished.
    TimedOut { pending: usize },
    /// The worker was never started or was already stopped.
    NotRunning,
}

enum Message {
    Job(PendingJob),
    Stop,
}

struct Lifecycle {
    state: WorkerState,
    receiver: Option<mpsc::UnboundedReceiver<Message>>,
    handle: Option<JoinHandle<()>>,
}

pub struct AsyncWorker {
    sender: mpsc::UnboundedSender<Message>,
    accepting: AtomicBool,
    started: AtomicBool,
    pending: Arc<AtomicUsize>,
    handler: Arc<dyn JobHandler>,
    runtime: Option<Handle>,
    lifecycle: Mutex<Lifecycle>,
    span: Span,
}

impl AsyncWorker {
    /// Create an idle worker. Nothing is spawned until `start` or the first `enqueue`.
    pub fn new(handler: Arc<dyn JobHandler>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            accepting: AtomicBool::new(true),
            started: AtomicBool::new(false),
            pending: Arc::new(AtomicUsize::new(0)),
            handler,
            runtime: None,
            lifecycle: Mutex::new(Lifecycle {
                state: WorkerState::Idle,
                receiver: Some(receiver),
                handle: None,
            }),
            span: Span::none(),
        }
    }

    /// Spawn the processing task on `runtime`, whichever thread triggers the start.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.lock().state
    }

    /// Jobs accepted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Spawn the processing task. Idempotent while running.
    ///
    /// Uses the runtime given to `with_runtime`, else the caller's current one.
    pub fn start(&self) -> ProxyResult<()> {
        let mut lifecycle = self.lock();
        match lifecycle.state {
            WorkerState::Running => return Ok(()),
            WorkerState::Stopped => return Err(ProxyError::WorkerStopped),
            WorkerState::Idle => {}
        }

        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| ProxyError::NoRuntime)?,
        };
        let receiver = lifecycle
            .receiver
            .take()
            .ok_or(ProxyError::WorkerStopped)?;
        let loop_future = run_loop(receiver, Arc::clone(&self.handler), Arc::clone(&self.pending));
        lifecycle.handle = Some(runtime.spawn(loop_future.instrument(self.span.clone())));
        lifecycle.state = WorkerState::Running;
        self.started.store(true, Ordering::Release);

        tracing::debug!(parent: &self.span, "async worker started");
        Ok(())
    }

    /// Append a job to the queue. Never waits for the queue itself.
    pub fn enqueue(&self, job: PendingJob) -> ProxyResult<()> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(ProxyError::WorkerStopped);
        }
        if !self.started.load(Ordering::Acquire) {
            self.start()?;
        }

        self.pending.fetch_add(1, Ordering::AcqRel);
        if self.sender.send(Message::Job(job)).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            return Err(ProxyError::WorkerStopped);
        }
        publish_depth(&self.pending);
        Ok(())
    }

    /// Stop accepting jobs and wait up to `timeout` for the queue to drain.
    ///
    /// Jobs queued before this call run first. On timeout the task keeps running
    /// detached; nothing in flight is cancelled.
    pub async fn shutdown(&self, timeout: Duration) -> DrainOutcome {
        self.accepting.store(false, Ordering::Release);

        let handle = {
            let mut lifecycle = self.lock();
            let previous = std::mem::replace(&mut lifecycle.state, WorkerState::Stopped);
            lifecycle.receiver = None;
            match previous {
                WorkerState::Running => {
                    let _ = self.sender.send(Message::Stop);
                    lifecycle.handle.take()
                }
                WorkerState::Idle | WorkerState::Stopped => None,
            }
        };

        let Some(handle) = handle else {
            return DrainOutcome::NotRunning;
        };

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(())) => {
                tracing::debug!(parent: &self.span, "async worker drained");
                DrainOutcome::Drained
            }
            Ok(Err(e)) => {
                tracing::error!(parent: &self.span, error = %e, "async worker task ended abnormally");
                DrainOutcome::Drained
            }
            Err(_) => {
                let pending = self.pending();
                tracing::warn!(
                    parent: &self.span,
                    pending,
                    timeout_secs = timeout.as_secs_f64(),
                    "async worker did not drain before shutdown timeout"
                );
                DrainOutcome::TimedOut { pending }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AsyncWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWorker")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

async fn run_loop(
    mut receiver: mpsc::UnboundedReceiver<Message>,
    handler: Arc<dyn JobHandler>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(message) = receiver.recv().await {
        match message {
            Message::Job(job) => run_job(handler.as_ref(), job, &pending).await,
            Message::Stop => {
                // Jobs that raced past the accepting check are still ours.
                receiver.close();
                while let Some(message) = receiver.recv().await {
                    if let Message::Job(job) = message {
                        run_job(handler.as_ref(), job, &pending).await;
                    }
                }
                break;
            }
        }
    }
    tracing::debug!("async worker stopped");
}

async fn run_job(handler: &dyn JobHandler, job: PendingJob, pending: &AtomicUsize) {
    let method = job.request.method.clone();
    let url = job.request.url.clone();

    match AssertUnwindSafe(handler.handle(job)).catch_unwind().await {
        Ok(Ok(_)) => {}
        Ok(Err(error)) => {
            tracing::debug!(%method, %url, %error, "queued send failed");
        }
        Err(panic) => {
            tracing::error!(
                %method,
                %url,
                panic = %panic_message(panic.as_ref()),
                "Failed processing job"
            );
        }
    }

    pending.fetch_sub(1, Ordering::AcqRel);
    publish_depth(pending);
}

/// Gauge follows the counter as it stands now, not a value read before the update.
fn publish_depth(pending: &AtomicUsize) {
    metrics::record_queue_depth(pending.load(Ordering::Acquire));
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
