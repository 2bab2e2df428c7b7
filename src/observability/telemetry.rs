//! Per-client observability handle.

use tracing::Span;
use url::Url;

/// Span under which a client emits all of its events.
///
/// Passed in at construction so applications can route or silence one client's
/// output without touching global state.
#[derive(Debug, Clone)]
pub struct Telemetry {
    span: Span,
}

impl Telemetry {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    /// Default span, tagged with the base URI.
    pub fn for_base_uri(base_uri: &Url) -> Self {
        Self::new(tracing::info_span!("proxy_client", base_uri = %base_uri))
    }

    /// A handle that emits events without a parent span.
    pub fn disabled() -> Self {
        Self::new(Span::none())
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}
