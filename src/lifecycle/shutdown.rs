//! Worker drain at application exit.

use std::time::Duration;

use crate::dispatch::{AsyncWorker, DrainOutcome};

/// Key combination that interrupts the process on this platform.
pub fn interrupt_hint() -> &'static str {
    if cfg!(windows) {
        "Ctrl-Break"
    } else {
        "Ctrl-C"
    }
}

/// User-facing notice printed before waiting on queued jobs.
pub fn drain_notice(pending: usize, timeout: Duration) -> String {
    format!(
        "proxy client is attempting to send {pending} pending request(s)\n\
         Waiting up to {} seconds\n\
         Press {} to quit",
        timeout.as_secs_f64(),
        interrupt_hint()
    )
}

/// Shut `worker` down, telling the user on stderr when jobs are still queued.
pub async fn drain_with_notice(worker: &AsyncWorker, timeout: Duration) -> DrainOutcome {
    let pending = worker.pending();
    if pending > 0 {
        eprintln!("{}", drain_notice(pending, timeout));
    }
    tracing::info!(pending, timeout_secs = timeout.as_secs_f64(), "draining async worker");

    let outcome = worker.shutdown(timeout).await;
    if let DrainOutcome::TimedOut { pending } = outcome {
        eprintln!("gave up with {pending} request(s) still pending");
    }
    outcome
}
