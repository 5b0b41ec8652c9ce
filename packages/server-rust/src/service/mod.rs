//! Service decorators.
//!
//! Each decorator wraps any [`StringService`] and is itself a
//! `StringService`, so layers stack in any order:
//!
//! 1. **Logging** (`logging`): one structured record per call
//! 2. **Instrumenting** (`instrumenting`): request count, latency, and result metrics
//!
//! [`decorate`] builds the default stack, with instrumenting outermost so its
//! latency includes the time spent logging.

pub mod instrumenting;
pub mod logging;

pub use instrumenting::InstrumentingService;
pub use logging::LoggingService;

use stringsvc_core::StringService;

use crate::metrics::ServiceMetrics;

/// The default decorated stack: `base -> logging -> instrumenting`.
pub type DecoratedService<S> = InstrumentingService<LoggingService<S>>;

/// Wraps `base` in the logging decorator, then the instrumenting decorator.
#[must_use]
pub fn decorate<S: StringService>(base: S, metrics: &ServiceMetrics) -> DecoratedService<S> {
    InstrumentingService::new(LoggingService::new(base), metrics.clone())
}
