//! `GET /metrics`: Prometheus scrape output.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Renders the installed Prometheus recorder, or 404 when none is installed.
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.prometheus {
        Some(handle) => (
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;
    use crate::network::handlers::tests::test_state;

    #[tokio::test]
    async fn not_found_without_exporter() {
        let resp = metrics_handler(State(test_state())).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn renders_with_exporter() {
        // A recorder that is built but not installed still renders.
        let recorder = PrometheusBuilder::new().build_recorder();
        let mut state = test_state();
        state.prometheus = Some(recorder.handle());

        let resp = metrics_handler(State(state)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            PROMETHEUS_CONTENT_TYPE
        );
    }
}
