//! Network module with deferred startup lifecycle.
//!
//! `new()` wires the shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    count_handler, health_handler, liveness_handler, metrics_handler, readiness_handler,
    uppercase_handler, AppState,
};
use super::lifecycle::Lifecycle;
use super::middleware::build_http_layers;
use crate::endpoint::Endpoints;
use crate::metrics::ServiceMetrics;

/// Errors from the server lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("serve() called before start()")]
    NotStarted,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Owns the HTTP server lifecycle.
///
/// 1. `new()` -- builds the shared `AppState`
/// 2. `start()` -- binds the listener to the configured address
/// 3. `serve()` -- serves until shutdown, then drains in-flight requests
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    state: AppState,
}

impl NetworkModule {
    /// Creates the module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig, endpoints: Endpoints, metrics: ServiceMetrics) -> Self {
        Self {
            config,
            listener: None,
            state: AppState::new(endpoints, metrics, Arc::new(Lifecycle::new())),
        }
    }

    /// Exposes `handle` at `GET /metrics`.
    #[must_use]
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.state.prometheus = Some(handle);
        self
    }

    /// Shared health and in-flight tracker.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<Lifecycle> {
        Arc::clone(&self.state.lifecycle)
    }

    /// Assembles the router.
    ///
    /// Routes:
    /// - `POST /uppercase` -- `{"s": ...}` -> `{"v": ..., "err"?: ...}`
    /// - `POST /count` -- `{"s": ...}` -> `{"v": ...}`
    /// - `GET /metrics` -- Prometheus text format
    /// - `GET /health`, `/health/live`, `/health/ready`
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/uppercase", post(uppercase_handler))
            .route("/count", post(count_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .layer(build_http_layers(&self.config))
            .with_state(self.state.clone())
    }

    /// Binds the listener and returns the bound port, which differs from the
    /// configured one when port 0 is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> Result<u16, NetworkError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!(host = %self.config.host, port, "listener bound");

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then waits up to the
    /// configured drain timeout for in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::NotStarted`] if `start()` was not called, or
    /// an I/O error if the server fails.
    pub async fn serve(
        mut self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), NetworkError> {
        let listener = self.listener.take().ok_or(NetworkError::NotStarted)?;
        let router = self.build_router();
        let lifecycle = self.lifecycle();
        let drain_timeout = self.config.drain_timeout;

        lifecycle.set_ready();
        info!("serving string service");

        let drain_on_shutdown = {
            let lifecycle = Arc::clone(&lifecycle);
            async move {
                shutdown.await;
                lifecycle.begin_drain();
            }
        };
        axum::serve(listener, router)
            .with_graceful_shutdown(drain_on_shutdown)
            .await?;

        if lifecycle.wait_for_drain(drain_timeout).await {
            info!("all requests drained");
        } else {
            warn!(
                in_flight = lifecycle.in_flight_count(),
                "drain timeout expired with requests in flight"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use stringsvc_core::BaseStringService;
    use tower::ServiceExt;

    use super::*;
    use crate::endpoint::build_endpoints;
    use crate::network::HealthState;
    use crate::service::decorate;

    fn module() -> NetworkModule {
        let metrics = ServiceMetrics::default();
        let endpoints = build_endpoints(Arc::new(decorate(BaseStringService, &metrics)));
        NetworkModule::new(NetworkConfig::default(), endpoints, metrics)
    }

    async fn post_json(router: Router, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn uppercase_route_round_trip() {
        let router = module().build_router();
        let (status, body) = post_json(router, "/uppercase", r#"{"s":"hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "v": "HELLO" }));
    }

    #[tokio::test]
    async fn uppercase_route_reports_empty_input_in_body() {
        let router = module().build_router();
        let (status, body) = post_json(router, "/uppercase", r#"{"s":""}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "v": "", "err": "empty string" }));
    }

    #[tokio::test]
    async fn count_route_round_trip() {
        let router = module().build_router();
        let (status, body) = post_json(router, "/count", r#"{"s":"hello"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "v": 5 }));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let router = module().build_router();
        let (status, body) = post_json(router, "/count", r#"{"s":5}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn body_without_s_is_treated_as_empty_input() {
        let (status, body) = post_json(module().build_router(), "/uppercase", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "v": "", "err": "empty string" }));

        let (status, body) = post_json(module().build_router(), "/count", "{}").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "v": 0 }));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let router = module().build_router();
        let request = Request::post("/count")
            .header("x-request-id", "fixed-id")
            .body(Body::from(r#"{"s":"a"}"#))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.headers()["x-request-id"], "fixed-id");
    }

    #[tokio::test]
    async fn get_on_operation_route_is_rejected() {
        let router = module().build_router();
        let request = Request::get("/uppercase").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = module();
        let port = module.start().await.unwrap();
        assert!(port > 0);
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_fails() {
        let err = module().serve(std::future::pending()).await.unwrap_err();
        assert!(matches!(err, NetworkError::NotStarted));
    }

    #[tokio::test]
    async fn serve_stops_after_shutdown_signal() {
        let mut module = module();
        module.start().await.unwrap();
        let lifecycle = module.lifecycle();

        module.serve(std::future::ready(())).await.unwrap();
        assert_eq!(lifecycle.health_state(), HealthState::Stopped);
    }
}
