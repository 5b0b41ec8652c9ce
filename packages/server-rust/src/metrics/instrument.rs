//! Labeled counters and histograms.
//!
//! Each instrument declares a fixed label schema at construction. Callers
//! address a series with flat key/value pairs:
//!
//! ```
//! # use stringsvc_server::metrics::Counter;
//! let requests = Counter::new("request_count", &["method", "error"]);
//! requests.with(&["method", "count", "error", "false"]).add(1);
//! assert_eq!(requests.value(&["method", "count", "error", "false"]), 1);
//! ```
//!
//! Series live in a sharded concurrent map: counter series are atomics, and a
//! histogram series updates its count and sum together under the shard lock.
//! Every write is also forwarded to the `metrics` facade, where an installed
//! exporter (see [`super::install_prometheus`]) can pick it up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use metrics::Label;

/// Label values of one series, ordered as the instrument's schema.
type SeriesKey = Vec<String>;

// ---------------------------------------------------------------------------
// Label schema
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Schema {
    name: String,
    keys: Vec<&'static str>,
}

impl Schema {
    fn new(name: impl Into<String>, keys: &[&'static str]) -> Self {
        Self {
            name: name.into(),
            keys: keys.to_vec(),
        }
    }

    /// Validates `pairs` against the schema and returns the ordered values.
    ///
    /// A mismatch is a wiring bug in the caller, so it panics rather than
    /// returning an error.
    fn series_key(&self, pairs: &[&str]) -> SeriesKey {
        assert!(
            pairs.len() % 2 == 0,
            "metric `{}`: label arguments must be key/value pairs, got {} values",
            self.name,
            pairs.len()
        );
        assert!(
            pairs.len() / 2 == self.keys.len(),
            "metric `{}`: expected labels {:?}, got {} pairs",
            self.name,
            self.keys,
            pairs.len() / 2
        );
        pairs
            .chunks_exact(2)
            .zip(&self.keys)
            .map(|(pair, expected)| {
                assert!(
                    pair[0] == *expected,
                    "metric `{}`: unexpected label `{}`, expected `{}`",
                    self.name,
                    pair[0],
                    expected
                );
                pair[1].to_string()
            })
            .collect()
    }

    fn facade_labels(&self, values: &[String]) -> Vec<Label> {
        self.keys
            .iter()
            .zip(values)
            .map(|(key, value)| Label::new(*key, value.clone()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// Monotonic counter addressed by a fixed label schema. Cheap to clone; clones
/// share the same series.
#[derive(Debug, Clone)]
pub struct Counter {
    schema: Arc<Schema>,
    series: Arc<DashMap<SeriesKey, AtomicU64>>,
}

impl Counter {
    /// Creates a counter named `name` whose series are keyed by `label_keys`.
    #[must_use]
    pub fn new(name: impl Into<String>, label_keys: &[&'static str]) -> Self {
        Self {
            schema: Arc::new(Schema::new(name, label_keys)),
            series: Arc::new(DashMap::new()),
        }
    }

    /// Fully qualified metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Selects the series for the given key/value pairs.
    ///
    /// # Panics
    ///
    /// Panics if `pairs` has an odd length or its keys do not match the
    /// schema declared at construction, in order.
    #[must_use]
    pub fn with(&self, pairs: &[&str]) -> LabeledCounter<'_> {
        LabeledCounter {
            counter: self,
            key: self.schema.series_key(pairs),
        }
    }

    /// Current value of a series; zero if it was never written.
    ///
    /// # Panics
    ///
    /// Panics on a label schema mismatch, as [`Counter::with`] does.
    #[must_use]
    pub fn value(&self, pairs: &[&str]) -> u64 {
        let key = self.schema.series_key(pairs);
        self.series
            .get(&key)
            .map_or(0, |cell| cell.load(Ordering::Acquire))
    }

    /// Sum over every series.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.series
            .iter()
            .map(|cell| cell.value().load(Ordering::Acquire))
            .sum()
    }
}

/// A counter bound to one label set.
#[derive(Debug)]
pub struct LabeledCounter<'a> {
    counter: &'a Counter,
    key: SeriesKey,
}

impl LabeledCounter<'_> {
    /// Adds `n` to the series.
    pub fn add(self, n: u64) {
        let labels = self.counter.schema.facade_labels(&self.key);
        self.counter
            .series
            .entry(self.key)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(n, Ordering::AcqRel);
        metrics::counter!(self.counter.schema.name.clone(), labels).increment(n);
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Point-in-time view of one histogram series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramSnapshot {
    /// Number of observations.
    pub count: u64,
    /// Sum of all observed values.
    pub sum: f64,
}

/// Count and sum of one series. Both fields change together under the map
/// shard's write lock, so a snapshot never pairs a count with a stale sum.
#[derive(Debug, Default)]
struct HistogramCell {
    count: u64,
    sum: f64,
}

impl HistogramCell {
    fn observe(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    fn snapshot(&self) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count,
            sum: self.sum,
        }
    }
}

/// Distribution of observed values addressed by a fixed label schema. An empty
/// schema gives an unlabeled histogram, observed through
/// [`Histogram::observe`].
#[derive(Debug, Clone)]
pub struct Histogram {
    schema: Arc<Schema>,
    series: Arc<DashMap<SeriesKey, HistogramCell>>,
}

impl Histogram {
    /// Creates a histogram named `name` whose series are keyed by `label_keys`.
    #[must_use]
    pub fn new(name: impl Into<String>, label_keys: &[&'static str]) -> Self {
        Self {
            schema: Arc::new(Schema::new(name, label_keys)),
            series: Arc::new(DashMap::new()),
        }
    }

    /// Fully qualified metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    /// Selects the series for the given key/value pairs.
    ///
    /// # Panics
    ///
    /// Panics if `pairs` has an odd length or its keys do not match the
    /// schema declared at construction, in order.
    #[must_use]
    pub fn with(&self, pairs: &[&str]) -> LabeledHistogram<'_> {
        LabeledHistogram {
            histogram: self,
            key: self.schema.series_key(pairs),
        }
    }

    /// Records `value` on an unlabeled histogram.
    ///
    /// # Panics
    ///
    /// Panics if the histogram was declared with label keys.
    pub fn observe(&self, value: f64) {
        self.with(&[]).observe(value);
    }

    /// Current state of a series, or `None` if it was never observed.
    ///
    /// # Panics
    ///
    /// Panics on a label schema mismatch, as [`Histogram::with`] does.
    #[must_use]
    pub fn snapshot(&self, pairs: &[&str]) -> Option<HistogramSnapshot> {
        let key = self.schema.series_key(pairs);
        self.series.get(&key).map(|cell| cell.snapshot())
    }
}

/// A histogram bound to one label set.
#[derive(Debug)]
pub struct LabeledHistogram<'a> {
    histogram: &'a Histogram,
    key: SeriesKey,
}

impl LabeledHistogram<'_> {
    /// Records one observation.
    pub fn observe(self, value: f64) {
        let labels = self.histogram.schema.facade_labels(&self.key);
        self.histogram
            .series
            .entry(self.key)
            .or_default()
            .observe(value);
        metrics::histogram!(self.histogram.schema.name.clone(), labels).record(value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn counter_tracks_series_independently() {
        let counter = Counter::new("requests", &["method", "error"]);
        counter.with(&["method", "count", "error", "false"]).add(1);
        counter.with(&["method", "count", "error", "false"]).add(2);
        counter.with(&["method", "uppercase", "error", "true"]).add(1);

        assert_eq!(counter.value(&["method", "count", "error", "false"]), 3);
        assert_eq!(counter.value(&["method", "uppercase", "error", "true"]), 1);
        assert_eq!(counter.value(&["method", "uppercase", "error", "false"]), 0);
        assert_eq!(counter.total(), 4);
    }

    #[test]
    fn clones_share_series() {
        let counter = Counter::new("requests", &["method"]);
        let clone = counter.clone();
        clone.with(&["method", "count"]).add(5);
        assert_eq!(counter.value(&["method", "count"]), 5);
    }

    #[test]
    #[should_panic(expected = "key/value pairs")]
    fn odd_label_arguments_panic() {
        let counter = Counter::new("requests", &["method", "error"]);
        counter.with(&["method", "count", "error"]).add(1);
    }

    #[test]
    #[should_panic(expected = "unexpected label `status`")]
    fn unknown_label_key_panics() {
        let counter = Counter::new("requests", &["method", "error"]);
        counter.with(&["method", "count", "status", "ok"]).add(1);
    }

    #[test]
    #[should_panic(expected = "expected labels")]
    fn missing_label_panics() {
        let histogram = Histogram::new("latency", &["method", "error"]);
        histogram.with(&["method", "count"]).observe(1.0);
    }

    #[test]
    #[should_panic(expected = "expected labels")]
    fn unlabeled_observe_on_labeled_histogram_panics() {
        let histogram = Histogram::new("latency", &["method"]);
        histogram.observe(1.0);
    }

    #[test]
    fn histogram_accumulates_count_and_sum() {
        let histogram = Histogram::new("latency", &["method"]);
        histogram.with(&["method", "count"]).observe(0.5);
        histogram.with(&["method", "count"]).observe(1.5);

        let snap = histogram.snapshot(&["method", "count"]).unwrap();
        assert_eq!(snap.count, 2);
        assert!((snap.sum - 2.0).abs() < f64::EPSILON);
        assert!(histogram.snapshot(&["method", "uppercase"]).is_none());
    }

    #[test]
    fn unlabeled_histogram_observes_directly() {
        let histogram = Histogram::new("count_result", &[]);
        histogram.observe(5.0);
        histogram.observe(0.0);

        let snap = histogram.snapshot(&[]).unwrap();
        assert_eq!(snap.count, 2);
        assert!((snap.sum - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concurrent_writers_lose_no_updates() {
        let counter = Counter::new("requests", &["method"]);
        let histogram = Histogram::new("latency", &["method"]);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        counter.with(&["method", "count"]).add(1);
                        histogram.with(&["method", "count"]).observe(1.0);
                    }
                });
            }
        });

        assert_eq!(counter.value(&["method", "count"]), 8_000);
        let snap = histogram.snapshot(&["method", "count"]).unwrap();
        assert_eq!(snap.count, 8_000);
        assert!((snap.sum - 8_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn snapshot_count_and_sum_stay_consistent_under_writes() {
        let histogram = Histogram::new("latency", &["method"]);
        histogram.with(&["method", "count"]).observe(1.0);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        histogram.with(&["method", "count"]).observe(1.0);
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..1_000 {
                    let snap = histogram.snapshot(&["method", "count"]).unwrap();
                    #[allow(clippy::cast_precision_loss)]
                    let expected = snap.count as f64;
                    assert!((snap.sum - expected).abs() < f64::EPSILON);
                }
            });
        });
    }
}
