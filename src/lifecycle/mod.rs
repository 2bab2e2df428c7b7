//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Stop accepting → notice on stderr → drain queue (bounded) → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → drain_with_notice
//!     second SIGINT  → abandon the drain
//! ```
//!
//! # Design Decisions
//! - No exit hook is installed; applications call these explicitly
//! - Shutdown has timeout: queued jobs left after the deadline are abandoned

pub mod shutdown;
pub mod signals;

pub use shutdown::{drain_notice, drain_with_notice};
pub use signals::{drain_interruptible, shutdown_on_signal, wait_for_signal};
