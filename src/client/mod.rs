//! Client façade subsystem.
//!
//! # Data Flow
//! ```text
//! RestClient verb (rest.rs)
//!     → ProxyClient::send (proxy.rs)
//!     → availability gate → dispatcher → tracker update → callbacks
//!     → status expectation check (rest.rs, warn only)
//! ```
//!
//! # Design Decisions
//! - One tracker per client, shared by direct and queued sends
//! - REST verbs never turn an unexpected status into an error

pub mod proxy;
pub mod rest;

pub use proxy::{ProxyClient, ProxyClientBuilder, SendRequest};
pub use rest::RestClient;
