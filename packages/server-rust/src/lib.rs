//! String service server: decorated service, endpoints, metrics, and the
//! HTTP transport that exposes them.
//!
//! Call path for one request:
//!
//! transport -> endpoint middleware -> endpoint -> decorated service -> base service

pub mod endpoint;
pub mod metrics;
pub mod network;
pub mod service;

#[cfg(test)]
mod test_support;

pub use endpoint::{build_endpoints, Call, CallContext, EndpointError, Endpoints};
pub use metrics::{MetricsConfig, ServiceMetrics};
pub use network::{NetworkConfig, NetworkModule};
pub use service::{decorate, InstrumentingService, LoggingService};
