//! HTTP plumbing subsystem.
//!
//! # Data Flow
//! ```text
//! SendRequest (client façade)
//!     → request.rs (OutboundRequest: resolved URL, query, headers, body, request ID)
//!     → transport.rs (reqwest call with per-call timeout)
//!     → response.rs (RawResponse → Response with lazy JSON)
//! ```

pub mod request;
pub mod response;
pub mod transport;

pub use request::{Body, OutboundRequest, X_REQUEST_ID};
pub use response::{Payload, RawResponse, Response};
pub use transport::{ReqwestTransport, Transport};
