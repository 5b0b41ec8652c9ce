//! Instrumenting decorator: request count, latency, and count-result metrics.

use std::time::Instant;

use stringsvc_core::{method_names, ServiceError, StringService};

use crate::metrics::ServiceMetrics;

// ---------------------------------------------------------------------------
// InstrumentingService
// ---------------------------------------------------------------------------

/// Decorator that records one request count and one latency observation per
/// call, labeled `{method, error}`, plus the result of every `count` call.
///
/// Recording happens on the return path from a drop guard, so it runs exactly
/// once per call even when the wrapped service unwinds.
#[derive(Debug, Clone)]
pub struct InstrumentingService<S> {
    inner: S,
    metrics: ServiceMetrics,
}

impl<S: StringService> InstrumentingService<S> {
    #[must_use]
    pub fn new(inner: S, metrics: ServiceMetrics) -> Self {
        Self { inner, metrics }
    }
}

impl<S: StringService> StringService for InstrumentingService<S> {
    fn uppercase(&self, s: &str) -> Result<String, ServiceError> {
        let mut observation = Observation::start(&self.metrics, method_names::UPPERCASE);
        // An unwinding delegate never reaches the assignment below, so it is
        // recorded as `error="false"`.
        let result = self.inner.uppercase(s);
        observation.failed = result.is_err();
        result
    }

    fn count(&self, s: &str) -> usize {
        let mut observation = Observation::start(&self.metrics, method_names::COUNT);
        let n = self.inner.count(s);
        observation.count_result = Some(n);
        n
    }
}

// ---------------------------------------------------------------------------
// Observation guard
// ---------------------------------------------------------------------------

struct Observation<'a> {
    metrics: &'a ServiceMetrics,
    method: &'static str,
    begin: Instant,
    failed: bool,
    count_result: Option<usize>,
}

impl<'a> Observation<'a> {
    fn start(metrics: &'a ServiceMetrics, method: &'static str) -> Self {
        Self {
            metrics,
            method,
            begin: Instant::now(),
            failed: false,
            count_result: None,
        }
    }
}

impl Drop for Observation<'_> {
    fn drop(&mut self) {
        let error = if self.failed { "true" } else { "false" };
        let labels = ["method", self.method, "error", error];
        self.metrics.request_count.with(&labels).add(1);
        self.metrics
            .request_latency
            .with(&labels)
            .observe(self.begin.elapsed().as_secs_f64());
        if let Some(n) = self.count_result {
            #[allow(clippy::cast_precision_loss)]
            self.metrics.count_result.observe(n as f64);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
