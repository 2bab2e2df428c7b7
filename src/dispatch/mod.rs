//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! send():
//!     → dispatcher.rs (transport call, classify, log, callbacks)
//!
//! send_queued():
//!     → job.rs (PendingJob: request + callbacks)
//!     → worker.rs (FIFO queue, one job at a time)
//!     → dispatcher.rs
//! ```
//!
//! # Design Decisions
//! - The dispatcher reports outcomes; it never retries
//! - The worker never retries either; a failed job is logged and dropped

pub mod dispatcher;
pub mod job;
pub mod worker;

pub use dispatcher::{Dispatcher, LOGGED_BODY_LIMIT};
pub use job::{Callbacks, FailureCallback, PendingJob, SuccessCallback};
pub use worker::{AsyncWorker, DrainOutcome, JobHandler, WorkerState};
