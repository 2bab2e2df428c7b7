//! Fail-fast HTTP client for a remote proxy service.
//!
//! # Architecture
//! ```text
//!  ┌──────────────────────── ProxyClient / RestClient ────────────────────────┐
//!  │  resolve endpoint → availability gate ──(inactive)──→ Unavailable        │
//!  │                          │                                               │
//!  │              ┌───────────┴────────────┐                                  │
//!  │          send().await            send_queued()                           │
//!  │              │                        │                                  │
//!  │              │                 AsyncWorker (FIFO, one task)              │
//!  │              └───────────┬────────────┘                                  │
//!  │                      Dispatcher → Transport (reqwest)                    │
//!  │                          │                                               │
//!  │            tracker.record_success / record_failure → callbacks          │
//!  └──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Subsystems
//! - `client`: façade, request builder, REST verbs
//! - `dispatch`: single-call dispatcher, callbacks, background worker
//! - `resilience`: availability tracker and failure classification
//! - `http`: request/response types and the transport capability
//! - `config`: TOML schema, loading, validation
//! - `lifecycle`: drain with notice, signal-driven shutdown
//! - `observability`: logging setup, metrics, per-client span

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use client::{ProxyClient, ProxyClientBuilder, RestClient, SendRequest};
pub use config::ClientConfig;
pub use dispatch::{Callbacks, DrainOutcome};
pub use error::{DeliveryError, ProxyError, ProxyResult, TransportError};
pub use http::{Body, Payload, Response};
pub use observability::Telemetry;
pub use resilience::{Availability, AvailabilityTracker};
