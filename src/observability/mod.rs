//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Dispatcher / worker / façade produce:
//!     → tracing events inside the client's Telemetry span
//!     → metrics.rs (counters and gauges through the `metrics` facade)
//!
//! Binaries decide where events go:
//!     → logging.rs (install a subscriber once, at startup)
//! ```
//!
//! # Design Decisions
//! - The library never installs a global subscriber or recorder
//! - Each client carries its own span, handed in at construction

pub mod logging;
pub mod metrics;
pub mod telemetry;

pub use telemetry::Telemetry;
