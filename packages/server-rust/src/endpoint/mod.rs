//! Endpoints: the uniform invocation unit between a transport and the
//! decorated service.
//!
//! An endpoint is a `tower::Service<Call<Req>>` bound to exactly one service
//! operation. The request type is part of the endpoint's type, so wiring an
//! endpoint to the wrong decoder fails to compile instead of failing at
//! runtime.
//!
//! - [`operations`]: one endpoint per service operation
//! - [`middleware`]: call/return logging as a Tower layer
//! - [`pipeline`]: builds the fully wrapped, type-erased endpoint set

pub mod middleware;
pub mod operations;
pub mod pipeline;

use std::future::Future;
use std::pin::Pin;

pub use middleware::{EndpointLogging, EndpointLoggingLayer};
pub use operations::{
    make_count_endpoint, make_uppercase_endpoint, CountEndpoint, UppercaseEndpoint,
};
pub use pipeline::{build_endpoints, CountHandler, Endpoints, UppercaseHandler};

/// Boxed future returned by endpoint middleware.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, EndpointError>> + Send>>;

// ---------------------------------------------------------------------------
// CallContext / Call
// ---------------------------------------------------------------------------

/// Per-call context carried alongside every endpoint request.
///
/// Used for log correlation only; nothing in the call path checks it for
/// cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    /// Process-unique identifier assigned by the transport.
    pub call_id: u64,
    /// Operation name (see `stringsvc_core::method_names`).
    pub method: &'static str,
    /// Transport-level request id, when the caller supplied or was assigned one.
    pub request_id: Option<String>,
}

impl CallContext {
    #[must_use]
    pub fn new(call_id: u64, method: &'static str) -> Self {
        Self {
            call_id,
            method,
            request_id: None,
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// An endpoint invocation: context plus the operation's typed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<T> {
    pub ctx: CallContext,
    pub request: T,
}

impl<T> Call<T> {
    #[must_use]
    pub fn new(ctx: CallContext, request: T) -> Self {
        Self { ctx, request }
    }
}

// ---------------------------------------------------------------------------
// EndpointError
// ---------------------------------------------------------------------------

/// Infrastructure failures raised inside the endpoint chain.
///
/// Business failures never appear here: they are encoded into the response.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_context_defaults_to_no_request_id() {
        let ctx = CallContext::new(7, "count");
        assert_eq!(ctx.call_id, 7);
        assert_eq!(ctx.method, "count");
        assert!(ctx.request_id.is_none());
    }

    #[test]
    fn call_context_carries_request_id() {
        let ctx = CallContext::new(1, "uppercase").with_request_id("abc-123");
        assert_eq!(ctx.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn internal_error_displays_cause() {
        let err = EndpointError::from(anyhow::anyhow!("downstream unreachable"));
        assert_eq!(err.to_string(), "internal error: downstream unreachable");
    }
}
