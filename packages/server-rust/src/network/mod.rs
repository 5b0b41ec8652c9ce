//! HTTP transport: routes, handlers, configuration, and server lifecycle.

pub mod config;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod module;

pub use config::NetworkConfig;
pub use error::TransportError;
pub use handlers::AppState;
pub use lifecycle::{HealthState, InFlightGuard, Lifecycle};
pub use module::{NetworkError, NetworkModule};
