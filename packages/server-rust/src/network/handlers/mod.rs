//! HTTP handler definitions.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod metrics;
pub mod operations;

pub use health::{health_handler, liveness_handler, readiness_handler};
pub use metrics::metrics_handler;
pub use operations::{count_handler, uppercase_handler};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::http::HeaderMap;
use metrics_exporter_prometheus::PrometheusHandle;

use super::Lifecycle;
use crate::endpoint::{CallContext, Endpoints};
use crate::metrics::ServiceMetrics;

/// Header carrying the per-request id assigned by the HTTP layers.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc`s and clone-cheap handles, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// One fully decorated endpoint per operation.
    pub endpoints: Endpoints,
    /// The metrics sink the decorators write to.
    pub metrics: ServiceMetrics,
    /// Scrape renderer, present when the Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
    /// Health state and in-flight tracking.
    pub lifecycle: Arc<Lifecycle>,
    /// Source of call ids.
    pub call_ids: Arc<AtomicU64>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    #[must_use]
    pub fn new(endpoints: Endpoints, metrics: ServiceMetrics, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            endpoints,
            metrics,
            prometheus: None,
            lifecycle,
            call_ids: Arc::new(AtomicU64::new(1)),
            start_time: Instant::now(),
        }
    }

    /// Builds the endpoint context for a request: a fresh call id plus the
    /// request id header, when present.
    #[must_use]
    pub fn call_context(&self, method: &'static str, headers: &HeaderMap) -> CallContext {
        let call_id = self.call_ids.fetch_add(1, Ordering::Relaxed);
        let ctx = CallContext::new(call_id, method);
        match headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(request_id) => ctx.with_request_id(request_id),
            None => ctx,
        }
    }
}
