//! One endpoint per service operation.
//!
//! Business failures from the service are encoded into the response's `err`
//! field and returned as `Ok`; only infrastructure failures use the error
//! channel.

use std::future::{ready, Ready};
use std::task::{Context, Poll};

use stringsvc_core::{
    CountRequest, CountResponse, StringService, UppercaseRequest, UppercaseResponse,
};
use tower::Service;

use super::{Call, EndpointError};

// ---------------------------------------------------------------------------
// UppercaseEndpoint
// ---------------------------------------------------------------------------

/// Endpoint bound to [`StringService::uppercase`].
///
/// `S` is usually an `Arc` around the decorated service so every endpoint
/// shares the same instance.
#[derive(Debug, Clone)]
pub struct UppercaseEndpoint<S> {
    service: S,
}

/// Builds the `uppercase` endpoint over `service`.
#[must_use]
pub fn make_uppercase_endpoint<S: StringService>(service: S) -> UppercaseEndpoint<S> {
    UppercaseEndpoint { service }
}

impl<S: StringService> Service<Call<UppercaseRequest>> for UppercaseEndpoint<S> {
    type Response = UppercaseResponse;
    type Error = EndpointError;
    type Future = Ready<Result<UppercaseResponse, EndpointError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call<UppercaseRequest>) -> Self::Future {
        let result = self.service.uppercase(&call.request.s);
        ready(Ok(UppercaseResponse::from_result(result)))
    }
}

// ---------------------------------------------------------------------------
// CountEndpoint
// ---------------------------------------------------------------------------

/// Endpoint bound to [`StringService::count`].
#[derive(Debug, Clone)]
pub struct CountEndpoint<S> {
    service: S,
}

/// Builds the `count` endpoint over `service`.
#[must_use]
pub fn make_count_endpoint<S: StringService>(service: S) -> CountEndpoint<S> {
    CountEndpoint { service }
}

impl<S: StringService> Service<Call<CountRequest>> for CountEndpoint<S> {
    type Response = CountResponse;
    type Error = EndpointError;
    type Future = Ready<Result<CountResponse, EndpointError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, call: Call<CountRequest>) -> Self::Future {
        let v = self.service.count(&call.request.s);
        ready(Ok(CountResponse { v }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
