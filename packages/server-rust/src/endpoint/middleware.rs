//! Call/return logging middleware for endpoints.
//!
//! Logs `calling endpoint` before delegating and `called endpoint` on every
//! exit path: success, infrastructure error, a panicking delegate, or the
//! call future being dropped before completion.

use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info, info_span, Instrument, Span};

use super::{BoxFuture, Call, EndpointError};

// ---------------------------------------------------------------------------
// EndpointLoggingLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps an endpoint with call/return logging, tagged with
/// the operation's method name for correlation.
///
/// Layers compose like any Tower layer: the outermost one observes the full
/// latency of everything inside it.
#[derive(Debug, Clone, Copy)]
pub struct EndpointLoggingLayer {
    method: &'static str,
}

impl EndpointLoggingLayer {
    #[must_use]
    pub fn new(method: &'static str) -> Self {
        Self { method }
    }
}

impl<E> Layer<E> for EndpointLoggingLayer {
    type Service = EndpointLogging<E>;

    fn layer(&self, inner: E) -> Self::Service {
        EndpointLogging {
            inner,
            method: self.method,
        }
    }
}

// ---------------------------------------------------------------------------
// EndpointLogging
// ---------------------------------------------------------------------------

/// Endpoint wrapper produced by [`EndpointLoggingLayer`].
#[derive(Debug, Clone)]
pub struct EndpointLogging<E> {
    inner: E,
    method: &'static str,
}

impl<E, R> Service<Call<R>> for EndpointLogging<E>
where
    E: Service<Call<R>, Error = EndpointError>,
    E::Response: Send + 'static,
    E::Future: Send + 'static,
{
    type Response = E::Response;
    type Error = EndpointError;
    type Future = BoxFuture<E::Response>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: Call<R>) -> Self::Future {
        let span = info_span!(
            "endpoint",
            method = self.method,
            call_id = call.ctx.call_id,
            request_id = call.ctx.request_id.as_deref(),
        );

        // The guard exists before the delegate is invoked, so the return
        // record is written even if `inner.call` itself unwinds. It then moves
        // into the returned future and fires when that future completes or is
        // dropped.
        let returned = ReturnLog::new(span.clone());
        let fut = {
            let _entered = span.enter();
            info!("calling endpoint");
            self.inner.call(call)
        };

        Box::pin(
            async move {
                let mut returned = returned;
                let result = fut.await;
                returned.outcome = Some(if result.is_ok() { "ok" } else { "error" });
                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// ReturnLog guard
// ---------------------------------------------------------------------------

/// Writes the `called endpoint` record when dropped.
struct ReturnLog {
    span: Span,
    begin: Instant,
    outcome: Option<&'static str>,
}

impl ReturnLog {
    fn new(span: Span) -> Self {
        Self {
            span,
            begin: Instant::now(),
            outcome: None,
        }
    }
}

impl Drop for ReturnLog {
    fn drop(&mut self) {
        let _entered = self.span.enter();
        info!(
            outcome = self.outcome.unwrap_or("interrupted"),
            took = ?self.begin.elapsed(),
            "called endpoint"
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
