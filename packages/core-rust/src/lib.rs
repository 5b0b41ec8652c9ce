//! String service core: the business contract, its canonical implementation,
//! and the wire messages exchanged with transports.

pub mod messages;
pub mod service;

pub use messages::{CountRequest, CountResponse, UppercaseRequest, UppercaseResponse};
pub use service::{method_names, BaseStringService, ServiceError, StringService};
