//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGINT (Ctrl-C) or SIGTERM
//! - Drain the async worker once a signal arrives
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A second Ctrl-C during the drain abandons it
//! - Nothing is registered implicitly; the application awaits these futures itself

use std::io;
use std::time::Duration;

use crate::dispatch::{AsyncWorker, DrainOutcome};
use crate::lifecycle::shutdown::drain_with_notice;

/// Resolve on the first SIGINT or SIGTERM.
#[cfg(unix)]
pub async fn wait_for_signal() -> io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

/// Resolve on the first Ctrl-C.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Drain `worker`, giving up early if the user interrupts again.
pub async fn drain_interruptible(worker: &AsyncWorker, timeout: Duration) -> io::Result<DrainOutcome> {
    tokio::select! {
        outcome = drain_with_notice(worker, timeout) => Ok(outcome),
        result = tokio::signal::ctrl_c() => {
            result?;
            let pending = worker.pending();
            tracing::warn!(pending, "drain interrupted, abandoning queued requests");
            Ok(DrainOutcome::TimedOut { pending })
        }
    }
}

/// Wait for a termination signal, then drain `worker` within `timeout`.
pub async fn shutdown_on_signal(worker: &AsyncWorker, timeout: Duration) -> io::Result<DrainOutcome> {
    wait_for_signal().await?;
    tracing::info!("Shutdown signal received");
    drain_interruptible(worker, timeout).await
}
