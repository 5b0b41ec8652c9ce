//! Metrics sink consulted by the instrumenting decorator.
//!
//! [`ServiceMetrics`] is constructed once at startup and handed to every
//! decorator that needs it; nothing here is reached through global state.
//! Writes are mirrored to the `metrics` facade, so installing the Prometheus
//! recorder with [`install_prometheus`] exposes them for scraping. Without an
//! installed recorder the facade writes are no-ops and the in-process series
//! remain the source of truth.

pub mod instrument;

use std::time::Duration;

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tracing::debug;

pub use instrument::{Counter, Histogram, HistogramSnapshot, LabeledCounter, LabeledHistogram};

/// Label schema shared by the request counter and latency histogram.
pub const REQUEST_LABELS: [&str; 2] = ["method", "error"];

/// Errors raised while setting up the metrics exporter.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("failed to install prometheus recorder")]
    Install(#[from] BuildError),
}

// ---------------------------------------------------------------------------
// MetricsConfig
// ---------------------------------------------------------------------------

/// Naming for the service's metrics: `{namespace}_{subsystem}_{metric}`.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    pub namespace: String,
    pub subsystem: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            namespace: "my_group".to_string(),
            subsystem: "string_service".to_string(),
        }
    }
}

impl MetricsConfig {
    fn full_name(&self, metric: &str) -> String {
        [self.namespace.as_str(), self.subsystem.as_str(), metric]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join("_")
    }
}

// ---------------------------------------------------------------------------
// ServiceMetrics
// ---------------------------------------------------------------------------

/// The instruments recorded for every string service call.
///
/// Clones share the underlying series, so one instance can be created at
/// process start and cloned into each decorator.
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    /// Number of requests received, labeled `{method, error}`.
    pub request_count: Counter,
    /// Request latency in seconds, labeled `{method, error}`.
    pub request_latency: Histogram,
    /// Distribution of `count` results. Unlabeled.
    pub count_result: Histogram,
}

impl ServiceMetrics {
    /// Builds the instruments and registers their descriptions with the
    /// `metrics` facade.
    #[must_use]
    pub fn new(config: &MetricsConfig) -> Self {
        let metrics = Self {
            request_count: Counter::new(config.full_name("request_count"), &REQUEST_LABELS),
            request_latency: Histogram::new(
                config.full_name("request_latency_seconds"),
                &REQUEST_LABELS,
            ),
            count_result: Histogram::new(config.full_name("count_result"), &[]),
        };
        metrics.describe();
        metrics
    }

    fn describe(&self) {
        describe_counter!(
            self.request_count.name().to_string(),
            Unit::Count,
            "Number of requests received."
        );
        describe_histogram!(
            self.request_latency.name().to_string(),
            Unit::Seconds,
            "Total duration of requests in seconds."
        );
        describe_histogram!(
            self.count_result.name().to_string(),
            "The result of each count method."
        );
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new(&MetricsConfig::default())
    }
}

/// Installs the Prometheus recorder as the process-wide `metrics` backend and
/// returns the handle used to render the scrape output.
///
/// Call once at startup, before any [`ServiceMetrics`] is built, so metric
/// descriptions reach the exporter.
///
/// # Errors
///
/// Returns [`MetricsError::Install`] if a recorder is already installed.
pub fn install_prometheus() -> Result<PrometheusHandle, MetricsError> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

// ---------------------------------------------------------------------------
// Exporter upkeep
// ---------------------------------------------------------------------------

/// Background task that periodically runs the exporter's upkeep.
///
/// Stop it with [`UpkeepTask::shutdown`], which also runs one last upkeep so
/// the final scrape state is settled.
#[derive(Debug)]
pub struct UpkeepTask {
    handle: PrometheusHandle,
    task: JoinHandle<()>,
}

impl UpkeepTask {
    /// Returns `true` until the task has been stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Aborts the periodic task and runs a final upkeep.
    pub async fn shutdown(self) {
        self.task.abort();
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                debug!(error = %e, "metrics upkeep task failed");
            }
        }
        self.handle.run_upkeep();
        debug!("metrics upkeep stopped");
    }
}

/// Spawns the exporter upkeep loop on the current tokio runtime.
#[must_use]
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> UpkeepTask {
    let ticker = handle.clone();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            ticker.run_upkeep();
        }
    });
    UpkeepTask { handle, task }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_names_follow_namespace_and_subsystem() {
        let metrics = ServiceMetrics::default();
        assert_eq!(
            metrics.request_count.name(),
            "my_group_string_service_request_count"
        );
        assert_eq!(
            metrics.request_latency.name(),
            "my_group_string_service_request_latency_seconds"
        );
        assert_eq!(
            metrics.count_result.name(),
            "my_group_string_service_count_result"
        );
    }

    #[test]
    fn empty_name_parts_are_skipped() {
        let config = MetricsConfig {
            namespace: String::new(),
            subsystem: "strings".to_string(),
        };
        let metrics = ServiceMetrics::new(&config);
        assert_eq!(metrics.request_count.name(), "strings_request_count");
    }

    #[test]
    fn second_install_keeps_exporter_error_as_source() {
        use std::error::Error as _;

        // Only this test installs a recorder, so at most the first call wins.
        let _ = install_prometheus();
        let err = install_prometheus().unwrap_err();

        assert!(matches!(err, MetricsError::Install(_)));
        assert!(err.source().is_some());
    }

    #[tokio::test]
    async fn upkeep_runs_until_shutdown() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let upkeep = spawn_upkeep(handle, Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(upkeep.is_running());

        tokio::time::timeout(Duration::from_secs(1), upkeep.shutdown())
            .await
            .expect("shutdown completes");
    }

    #[test]
    fn separate_instances_do_not_share_series() {
        let a = ServiceMetrics::default();
        let b = ServiceMetrics::default();
        a.request_count
            .with(&["method", "count", "error", "false"])
            .add(1);
        assert_eq!(
            b.request_count.value(&["method", "count", "error", "false"]),
            0
        );
    }
}
