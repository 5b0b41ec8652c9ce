//! Logging decorator: one structured record per service call.

use std::time::Instant;

use stringsvc_core::{method_names, ServiceError, StringService};
use tracing::{info, info_span, Span};

// ---------------------------------------------------------------------------
// LoggingService
// ---------------------------------------------------------------------------

/// Decorator that logs method, input, output, failure, and elapsed time of
/// every call after the wrapped service returns.
///
/// Purely an observer: results and failures pass through untouched, and
/// emitting the record cannot fail the call.
#[derive(Debug, Clone)]
pub struct LoggingService<S> {
    inner: S,
    span: Span,
}

impl<S: StringService> LoggingService<S> {
    /// Wraps `inner`, logging inside a `string_service` span.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self::with_span(inner, info_span!("string_service"))
    }

    /// Wraps `inner`, logging inside `span`. Lets callers attach their own
    /// context fields to every record.
    #[must_use]
    pub fn with_span(inner: S, span: Span) -> Self {
        Self { inner, span }
    }
}

impl<S: StringService> StringService for LoggingService<S> {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        let begin = Instant::now();
        let result = self.inner.uppercase(s);
        let took = begin.elapsed();

        let _entered = self.span.enter();
        match &result {
            Ok(output) => info!(
                method = %method_names::UPPERCASE,
                input = s,
                output = output.as_str(),
                took = ?took,
                "service call"
            ),
            Err(err) => info!(
                method = %method_names::UPPERCASE,
                input = s,
                output = "",
                err = %err,
                took = ?took,
                "service call"
            ),
        }
        result
    }

    fn count(&self, s: &str) -> usize {
        let begin = Instant::now();
        let output = self.inner.count(s);
        let took = begin.elapsed();

        let _entered = self.span.enter();
        info!(
            method = %method_names::COUNT,
            input = s,
            output,
            took = ?took,
            "service call"
        );
        output
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
