//! Pipeline composition: one fully wrapped endpoint per service operation.

use stringsvc_core::{
    method_names, CountRequest, CountResponse, StringService, UppercaseRequest,
    UppercaseResponse,
};
use tower::util::BoxCloneSyncService;
use tower::ServiceBuilder;

use super::middleware::EndpointLoggingLayer;
use super::operations::{make_count_endpoint, make_uppercase_endpoint};
use super::{Call, EndpointError};

/// Type-erased `uppercase` endpoint, cheap to clone per request.
pub type UppercaseHandler =
    BoxCloneSyncService<Call<UppercaseRequest>, UppercaseResponse, EndpointError>;

/// Type-erased `count` endpoint, cheap to clone per request.
pub type CountHandler = BoxCloneSyncService<Call<CountRequest>, CountResponse, EndpointError>;

/// The complete endpoint set a transport wires routes to: exactly one
/// endpoint per operation.
#[derive(Clone)]
pub struct Endpoints {
    pub uppercase: UppercaseHandler,
    pub count: CountHandler,
}

/// Builds every endpoint over the same (already decorated) service.
///
/// Layer order (outermost to innermost):
/// 1. `EndpointLoggingLayer` -- call/return logging tagged with the method name
/// 2. the operation endpoint, which invokes `service`
///
/// `service` is cloned once per endpoint; pass an `Arc` to share one instance.
#[must_use]
pub fn build_endpoints<S>(service: S) -> Endpoints
where
    S: StringService + Clone + 'static,
{
    let uppercase = ServiceBuilder::new()
        .layer(EndpointLoggingLayer::new(method_names::UPPERCASE))
        .service(make_uppercase_endpoint(service.clone()));

    let count = ServiceBuilder::new()
        .layer(EndpointLoggingLayer::new(method_names::COUNT))
        .service(make_count_endpoint(service));

    Endpoints {
        uppercase: BoxCloneSyncService::new(uppercase),
        count: BoxCloneSyncService::new(count),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
