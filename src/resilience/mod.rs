//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call about to leave:
//!     → availability.rs (should_try? otherwise fail fast)
//! Call finished:
//!     → classify.rs (does this outcome count against the server?)
//!     → availability.rs (record_success / record_failure)
//! ```
//!
//! # Design Decisions
//! - Timeouts are enforced by the transport on every call
//! - No per-request retries; the tracker only decides whether to contact the server at all
//! - Only transport failures and 5xx responses open the backoff window

pub mod availability;
pub mod classify;

pub use availability::{
    backoff_window, Availability, AvailabilitySnapshot, AvailabilityTracker, MAX_BACKOFF_STEP,
};
pub use classify::{counts_against_availability, is_server_error};
